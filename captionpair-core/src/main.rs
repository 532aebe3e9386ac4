//! src/main.rs
//! `cpair` command line front end over a captionpair [`Session`].

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use captionpair_core::{
    Config, LoggerBuilder,
    controller::Session,
    fs::FileEntry,
    logging::LoggerConfig,
    model::{CaptionState, MatchedEntry, Side},
    operators::{JobStatus, LocalFileSystem},
};

use cli::{CaptionCommands, Cli, Commands, ConfigCommands};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn init_logging(cli: &Cli) -> Result<WorkerGuard> {
    let log_dir = Config::config_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|_| PathBuf::from("./logs"));

    let config = LoggerConfig {
        log_dir,
        stderr: cli.log_stderr,
        ..LoggerConfig::default()
    };

    LoggerBuilder::new()
        .with_config(config)
        .with_level(&cli.log_level)
        .build()
        .await
        .context("Failed to initialize logging")
}

async fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path).await,
        None => Config::load().await,
    }
    .context("Failed to load configuration")?;

    Ok(config.with_directories(cli.left.clone(), cli.right.clone()))
}

async fn run(cli: Cli) -> Result<()> {
    let _guard = init_logging(&cli).await?;
    let config = load_config(&cli).await?;
    info!(command = ?cli.command, "Starting cpair");

    let fs = LocalFileSystem::new(config.delete_policy);
    let mut session = Session::new(config, fs);

    match cli.command {
        Commands::Config(ConfigCommands::Show) => {
            println!("{}", serde_json::to_string_pretty(session.config())?);
            return Ok(());
        }
        Commands::Config(ConfigCommands::Save) => {
            session.verify_caption_service().await?;
            match &cli.config {
                Some(path) => session.config().save_to(path).await?,
                None => session.config().save().await?,
            }
            println!("configuration saved");
            return Ok(());
        }
        Commands::Caption(CaptionCommands::Models) => {
            let client = session.caption_client()?;
            for model in client.list_models().await? {
                println!("{model}");
            }
            return Ok(());
        }
        Commands::Caption(CaptionCommands::Prompts) => {
            let client = session.caption_client()?;
            for prompt in client.list_prompts().await? {
                println!("{prompt}");
            }
            return Ok(());
        }
        _ => {}
    }

    session
        .read_directories(&cli.filter)
        .await
        .context("Failed to read directories")?;

    match cli.command {
        Commands::List => print_table(&session),
        Commands::Rename {
            hash,
            side,
            new_base,
        } => match session.rename(hash, side, &new_base).await? {
            Some(name) => println!("renamed {side} to {name}"),
            None => println!("name unchanged"),
        },
        Commands::Copy { hash, side } => {
            let to = session.copy_to_other_side(hash, side).await?;
            println!("copied {} to {to}", session.entry(hash)?.base_name);
        }
        Commands::Delete { hash, side } => {
            session.delete(hash, side).await?;
            println!("deleted {side} of {}", session.entry(hash)?.base_name);
        }
        Commands::Caption(CaptionCommands::Set { hash, side, text }) => {
            session.edit_caption(hash, side, text)?;
            let saved = session.save_caption(hash, side).await?;
            println!("saved {}", saved.path.display());
        }
        Commands::Caption(CaptionCommands::Paste {
            from_hash,
            from_side,
            to_hash,
            to_side,
        }) => {
            session.copy_caption_from(from_hash, from_side)?;
            session.paste_caption_to(to_hash, to_side)?;
            let saved = session.save_caption(to_hash, to_side).await?;
            println!("saved {}", saved.path.display());
        }
        Commands::Caption(CaptionCommands::Run {
            side,
            model,
            prompt,
        }) => {
            let client = session.caption_client()?;
            session.select_model(model);
            session.select_prompt(prompt);

            let status = session
                .run_caption_job(&client, side, print_progress)
                .await?;
            println!(
                "done: {} captioned, {} errors",
                status.captioned_count, status.error_count
            );

            if session.config().preview_only_captions {
                print_preview(&session, side);
            }
        }
        Commands::Caption(CaptionCommands::Models | CaptionCommands::Prompts) | Commands::Config(_) => {}
    }

    Ok(())
}

fn print_progress(status: &JobStatus) {
    println!(
        "{} of {} files processed ({:.0}%), {} captioned, {} errors",
        status.processed_count,
        status.total_count,
        status.progress() * 100.0,
        status.captioned_count,
        status.error_count
    );
}

fn describe(file: Option<&FileEntry>) -> String {
    file.map_or_else(
        || "-".to_owned(),
        |f| format!("{} ({}, {})", f.name, f.size_human(), f.format_date(DATE_FORMAT)),
    )
}

fn caption_marker(state: CaptionState) -> &'static str {
    match state {
        CaptionState::Absent => " ",
        CaptionState::Clean => "c",
        CaptionState::Dirty => "*",
    }
}

fn print_entry<F: captionpair_core::operators::FileSystem>(session: &Session<F>, entry: &MatchedEntry) {
    let cell = |side: Side| {
        let files = entry.side(side);
        format!(
            "{} [{}]",
            describe(files.media.as_ref()),
            caption_marker(session.caption_state(entry.hash, side))
        )
    };

    println!(
        "{:>10}  {:<24}  {:<48}  {}",
        entry.hash,
        entry.base_name,
        cell(Side::Left),
        cell(Side::Right)
    );
}

fn print_table<F: captionpair_core::operators::FileSystem>(session: &Session<F>) {
    for entry in session.store().iter() {
        print_entry(session, entry);
    }
    println!("{} entries", session.store().len());
}

fn print_preview<F: captionpair_core::operators::FileSystem>(session: &Session<F>, side: Side) {
    for entry in session.store().iter() {
        if session.caption_state(entry.hash, side) == CaptionState::Dirty {
            println!("{}: {}", entry.base_name, session.caption_text(entry.hash, side));
        }
    }
}
