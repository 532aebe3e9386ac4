use std::path::PathBuf;

use clap::{Parser, Subcommand};

use captionpair_core::model::{FileHash, Side};

#[derive(Debug, Parser)]
#[command(name = "cpair")]
#[command(about = "Compare two media directories and curate their captions", long_about = None)]
pub struct Cli {
    /// Left directory, overrides the saved configuration
    #[arg(long, global = true)]
    pub left: Option<String>,

    /// Right directory, overrides the saved configuration
    #[arg(long, global = true)]
    pub right: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Search pattern, e.g. `cat*`, `*.png`, `*dog*.jpg`
    #[arg(long, short, global = true, default_value = "")]
    pub filter: String,

    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also print log events to stderr
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the matched table
    List,
    /// Rename one side's media and caption, keeping the extension
    Rename {
        hash: FileHash,
        side: Side,
        new_base: String,
    },
    /// Copy media and caption to the other side
    Copy { hash: FileHash, side: Side },
    /// Delete (or trash) one side's media and caption
    Delete { hash: FileHash, side: Side },
    /// Caption editing and generation
    #[command(subcommand)]
    Caption(CaptionCommands),
    /// Inspect or persist the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum CaptionCommands {
    /// Replace the caption text and save it
    Set {
        hash: FileHash,
        side: Side,
        text: String,
    },
    /// Paste the caption of one cell into another and save it
    Paste {
        from_hash: FileHash,
        from_side: Side,
        to_hash: FileHash,
        to_side: Side,
    },
    /// List models offered by the caption service
    Models,
    /// List prompts offered by the caption service
    Prompts,
    /// Caption a whole side and wait for the job to finish
    Run {
        side: Side,
        #[arg(long)]
        model: String,
        #[arg(long)]
        prompt: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,
    /// Save the effective configuration, including directory overrides
    Save,
}
