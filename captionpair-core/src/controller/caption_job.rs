//! src/controller/caption_job.rs
//!
//! Running one caption generation job against the caption service and
//! folding its progress reports into the session's caption buffers.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::controller::session::Session;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::fs::file_entry::split_file_name;
use crate::model::{captions::merge_caption, match_table::Side};
use crate::operators::{
    caption_service::{CaptionServiceClient, JobStarted, JobStatus},
    file_system_operator::FileSystem,
};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub side: Side,
    pub prompt: String,
    pub preview_only: bool,

    /// Files whose status was already folded into the buffers.
    applied: HashSet<String>,
}

/// Model/prompt selection and the job currently running, if any.
#[derive(Debug, Clone, Default)]
pub struct CaptionJobState {
    pub selected_model: Option<String>,
    pub selected_prompt: Option<String>,
    loaded_model: Option<String>,
    active: Option<ActiveJob>,
}

impl CaptionJobState {
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveJob> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn loaded_model(&self) -> Option<&str> {
        self.loaded_model.as_deref()
    }
}

/// Base name of a reported file, which may be a bare name or a full path.
fn reported_base_name(file: &str) -> &str {
    let name = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    split_file_name(name).0
}

impl<F: FileSystem> Session<F> {
    #[must_use]
    pub const fn caption_job(&self) -> &CaptionJobState {
        &self.caption_job
    }

    /// Client for the configured service, if captioning is enabled.
    pub fn caption_client(&self) -> AppResult<CaptionServiceClient> {
        CaptionServiceClient::new(self.config.validate_for_caption_service()?)
    }

    /// Check that an enabled service answers and offers at least one model.
    pub async fn verify_caption_service(&self) -> AppResult<()> {
        if !self.config.caption_service_enabled {
            return Ok(());
        }
        let models = self.caption_client()?.list_models().await?;
        if models.is_empty() {
            return Err(AppError::validation(
                "captionServiceUrl",
                "caption service offers no models",
            ));
        }
        debug!(models = models.len(), "Caption service reachable");
        Ok(())
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.caption_job.selected_model = Some(model.into());
    }

    pub fn select_prompt(&mut self, prompt: impl Into<String>) {
        self.caption_job.selected_prompt = Some(prompt.into());
    }

    /// Start captioning the directory of `side`.
    ///
    /// The selected model is loaded on first use and kept for the session.
    pub async fn start_caption_job(
        &mut self,
        client: &CaptionServiceClient,
        side: Side,
    ) -> AppResult<JobStarted> {
        if self.caption_job.active.is_some() {
            return Err(AppError::validation("captionJob", "job already in progress"));
        }
        let model = self
            .caption_job
            .selected_model
            .clone()
            .ok_or_else(|| AppError::validation("model", "Please select a model first"))?;
        let prompt = self
            .caption_job
            .selected_prompt
            .clone()
            .ok_or_else(|| AppError::validation("prompt", "Please select a prompt first"))?;
        let directory = self.directory(side)?;

        if self.caption_job.loaded_model.as_deref() != Some(model.as_str()) {
            client.load_model(&model).await?;
            self.caption_job.loaded_model = Some(model);
        }

        let preview_only = self.config.preview_only_captions;
        let started = client
            .start_caption_directory(&directory.to_string_lossy(), &prompt, preview_only)
            .await?;

        self.caption_job.active = Some(ActiveJob {
            side,
            prompt,
            preview_only,
            applied: HashSet::new(),
        });
        Ok(started)
    }

    /// Poll until the job reports completion, applying every report.
    pub async fn poll_caption_job(&mut self, client: &CaptionServiceClient) -> AppResult<JobStatus> {
        self.poll_caption_job_with(client, |_| {}).await
    }

    /// Like [`Self::poll_caption_job`], calling `on_status` after each report.
    pub async fn poll_caption_job_with(
        &mut self,
        client: &CaptionServiceClient,
        mut on_status: impl FnMut(&JobStatus) + Send,
    ) -> AppResult<JobStatus> {
        if self.caption_job.active.is_none() {
            return Err(AppError::validation("captionJob", "no caption job is running"));
        }

        let period = self.config.caption_poll_interval.max(MIN_POLL_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let status = match client.job_status().await {
                Ok(status) => status,
                Err(e) => {
                    self.caption_job.active = None;
                    return Err(e);
                }
            };

            let applied = self.apply_job_status(&status).await;
            debug!(
                processed = status.processed_count,
                total = status.total_count,
                applied,
                "Caption job progress"
            );
            on_status(&status);

            if status.is_complete() {
                self.caption_job.active = None;
                info!(
                    marker = "CAPTION_JOB_COMPLETE",
                    operation_type = "caption_job",
                    captioned = status.captioned_count,
                    errors = status.error_count,
                    "Caption job finished"
                );
                return Ok(status);
            }
        }
    }

    /// Start a job and poll it to completion.
    pub async fn run_caption_job(
        &mut self,
        client: &CaptionServiceClient,
        side: Side,
        on_status: impl FnMut(&JobStatus) + Send,
    ) -> AppResult<JobStatus> {
        self.start_caption_job(client, side).await?;
        self.poll_caption_job_with(client, on_status).await
    }

    /// Fold newly reported captions into the buffers of the job's side.
    ///
    /// Returns how many files were applied. Files already applied by an
    /// earlier report, and files not in the table, are skipped. In write
    /// mode, caption files the service created are attached to their entry.
    pub async fn apply_job_status(&mut self, status: &JobStatus) -> usize {
        let Some(job) = self.caption_job.active.as_mut() else {
            return 0;
        };
        let side = job.side;
        let method = self.config.caption_update_method;
        let separator = self.config.caption_separator;

        let mut applied = 0;
        let mut written = Vec::new();
        for (file, file_status) in &status.per_file_status {
            if job.applied.contains(file) {
                continue;
            }

            let base = reported_base_name(file);
            let Some(entry) = self.store.get(base) else {
                warn!(file = %file, "Caption reported for a file not in the table");
                continue;
            };

            let buffer = self.captions.get_or_default(entry.hash, side);
            if job.preview_only {
                let merged = merge_caption(&buffer.current, &file_status.message, method, separator);
                buffer.edit(merged);
            } else {
                // Already written to disk by the service
                buffer.edit(file_status.message.clone());
                buffer.mark_saved();
                let files = entry.side(side);
                if let (Some(media), None) = (&files.media, &files.text) {
                    let text = media.path.with_file_name(format!("{}.txt", media.base_name()));
                    written.push((entry.hash, text));
                }
            }

            job.applied.insert(file.clone());
            applied += 1;
        }

        for (hash, path) in written {
            match self.fs.stat_file(&path).await {
                Ok(text) => match self.store.resolve_mut(hash) {
                    Ok(entry) => entry.side_mut(side).text = Some(text),
                    Err(e) => warn!(path = %path.display(), error = %e, "Captioned entry vanished"),
                },
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Service reported a caption it did not write");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Could not stat written caption"),
            }
        }

        applied
    }
}
