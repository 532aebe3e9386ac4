//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! A flat JSON record (`app_config.json`) stored in the platform config
//! directory resolved with [`directories`](https://docs.rs/directories).
//!
//! ## Features
//! - Missing file or missing keys fall back to defaults
//! - Keys written by earlier versions of the tool are accepted as aliases
//! - Async load/save via `tokio::fs`
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?.with_directories(left, right);
//! config.save().await?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::captions::{CaptionSeparator, CaptionUpdateMethod};

pub const CONFIG_FILE_NAME: &str = "app_config.json";

/// Default cadence for polling a running caption job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What deleting a file from the UI does on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Move into a `trash` sub-directory next to the file.
    Trash,

    #[default]
    Delete,
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub left_directory: String,

    pub right_directory: String,

    #[serde(alias = "delete")]
    pub delete_policy: DeletePolicy,

    #[serde(alias = "captionAiUrl")]
    pub caption_service_url: String,

    #[serde(alias = "captionAiEnabled")]
    pub caption_service_enabled: bool,

    /// Generated captions only fill the caption buffers; nothing is written.
    #[serde(alias = "previewOnlyAiCaptions")]
    pub preview_only_captions: bool,

    #[serde(alias = "captionBoxAiUpdateMethod")]
    pub caption_update_method: CaptionUpdateMethod,

    #[serde(alias = "captionBoxSeparator")]
    pub caption_separator: CaptionSeparator,

    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub caption_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_directory: String::new(),
            right_directory: String::new(),
            delete_policy: DeletePolicy::Delete,
            caption_service_url: String::new(),
            caption_service_enabled: false,
            preview_only_captions: false,
            caption_update_method: CaptionUpdateMethod::Replace,
            caption_separator: CaptionSeparator::Space,
            caption_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Config {
    /// Loads config from the platform config dir, or returns defaults.
    pub async fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_path()?).await
    }

    /// Saves config to the platform config dir.
    pub async fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        match TokioFs::read_to_string(path).await {
            Ok(text) => {
                info!("Loading config from {}", path.display());
                Ok(serde_json::from_str(&text)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No config file found at {}, using default configuration",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(AppError::io("read config", path, e)),
        }
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io("create config directory", parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        TokioFs::write(path, json)
            .await
            .map_err(|e| AppError::io("write config", path, e))
    }

    /// Apply directories given on the command line.
    #[must_use]
    pub fn with_directories(mut self, left: Option<String>, right: Option<String>) -> Self {
        if let Some(left) = left {
            self.left_directory = left;
        }
        if let Some(right) = right {
            self.right_directory = right;
        }
        self
    }

    /// Both directories, or a validation failure naming the empty one.
    pub fn directories(&self) -> AppResult<(PathBuf, PathBuf)> {
        if self.left_directory.trim().is_empty() {
            return Err(AppError::validation("leftDirectory", "left directory is not set"));
        }
        if self.right_directory.trim().is_empty() {
            return Err(AppError::validation("rightDirectory", "right directory is not set"));
        }
        Ok((
            PathBuf::from(&self.left_directory),
            PathBuf::from(&self.right_directory),
        ))
    }

    /// The service URL, provided captioning is enabled and configured.
    pub fn validate_for_caption_service(&self) -> AppResult<&str> {
        if !self.caption_service_enabled {
            return Err(AppError::validation(
                "captionServiceEnabled",
                "caption service is disabled",
            ));
        }
        let url = self.caption_service_url.trim();
        if url.is_empty() {
            return Err(AppError::validation(
                "captionServiceUrl",
                "caption service URL not configured",
            ));
        }
        Ok(url)
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> AppResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn config_dir() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "captionpair", "captionpair").ok_or(AppError::ConfigDir)?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
