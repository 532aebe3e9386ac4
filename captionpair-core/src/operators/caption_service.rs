//! `src/operators/caption_service.rs`
//!
//! HTTP client for the external caption generator service.
//!
//! The service owns the model runtime and writes caption files itself unless
//! asked for a preview. We only list what it offers, choose a model, start a
//! job for one directory and poll its status.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MODELS_PATH: &str = "available_models";
const PROMPTS_PATH: &str = "available_prompts";
const LOAD_MODEL_PATH: &str = "load_model_service";
const CAPTION_DIRECTORY_PATH: &str = "caption_directory";
const STATUS_PATH: &str = "caption_directory_status";

/// Join a base URL and a relative path with exactly one slash between them.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Names from either `{"name": ..}` (keys) or `["name", ..]`.
fn names_from(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_owned),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Serialize)]
struct LoadModelRequest<'a> {
    service_model: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptionDirectoryRequest<'a> {
    directory: &'a str,
    prompt: &'a str,
    preview_do_not_update: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileStatus {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    processed_files: u64,
    #[serde(default)]
    total_files: u64,
    #[serde(default)]
    captioned_files: u64,
    #[serde(default)]
    error_count: u64,
    #[serde(default)]
    file_statuses: BTreeMap<String, FileStatus>,
}

/// Progress of a running caption job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub processed_count: u64,
    pub total_count: u64,
    pub captioned_count: u64,
    pub error_count: u64,

    /// Reported file name (or path) to the generated caption.
    pub per_file_status: BTreeMap<String, FileStatus>,
}

impl JobStatus {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.processed_count >= self.total_count
    }

    /// Completed fraction in `0.0..=1.0`. An empty job counts as done.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_count == 0 {
            1.0
        } else {
            (self.processed_count as f64 / self.total_count as f64).min(1.0)
        }
    }
}

impl From<StatusResponse> for JobStatus {
    fn from(r: StatusResponse) -> Self {
        Self {
            processed_count: r.processed_files,
            total_count: r.total_files,
            captioned_count: r.captioned_files,
            error_count: r.error_count,
            per_file_status: r.file_statuses,
        }
    }
}

/// Response to a started job. The message is informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobStarted {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CaptionServiceClient {
    base_url: String,
    http: reqwest::Client,
}

impl CaptionServiceClient {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::remote_unavailable(base_url.clone(), e.to_string()))?;

        Ok(Self { base_url, http })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn transport_error(url: &str, e: &reqwest::Error) -> AppError {
        let reason = if e.is_timeout() {
            "request timed out".to_owned()
        } else if e.is_connect() {
            "service not reachable".to_owned()
        } else {
            e.to_string()
        };
        AppError::remote_unavailable(url, reason)
    }

    async fn check(url: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // FastAPI style `{"detail": ".."}` bodies carry the useful part
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or(body);

        Err(AppError::remote_unavailable(url, format!("HTTP {status}: {detail}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, &e))?;

        Self::check(&url, response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::remote_unavailable(&url, format!("invalid response: {e}")))
    }

    async fn post_json<B: Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, &e))?;

        Self::check(&url, response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::remote_unavailable(&url, format!("invalid response: {e}")))
    }

    async fn list(&self, path: &str, key: &str) -> AppResult<Vec<String>> {
        let body: Value = self.get_json(path).await?;
        let names = body.get(key).map(names_from).unwrap_or_default();
        debug!(count = names.len(), key, "Listed caption service options");
        Ok(names)
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.base_url))]
    pub async fn list_models(&self) -> AppResult<Vec<String>> {
        self.list(MODELS_PATH, "available_models").await
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.base_url))]
    pub async fn list_prompts(&self) -> AppResult<Vec<String>> {
        self.list(PROMPTS_PATH, "available_prompts").await
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.base_url))]
    pub async fn load_model(&self, model: &str) -> AppResult<()> {
        let _: Value = self
            .post_json(LOAD_MODEL_PATH, &LoadModelRequest { service_model: model })
            .await?;
        info!(model, "Caption model loaded");
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.base_url))]
    pub async fn start_caption_directory(
        &self,
        directory: &str,
        prompt: &str,
        preview_only: bool,
    ) -> AppResult<JobStarted> {
        let started: JobStarted = self
            .post_json(
                CAPTION_DIRECTORY_PATH,
                &CaptionDirectoryRequest {
                    directory,
                    prompt,
                    preview_do_not_update: preview_only,
                },
            )
            .await?;
        info!(directory, prompt, preview_only, message = %started.message, "Caption job started");
        Ok(started)
    }

    pub async fn job_status(&self) -> AppResult<JobStatus> {
        let status: StatusResponse = self.get_json(STATUS_PATH).await?;
        Ok(status.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h:1", "a"), "http://h:1/a");
        assert_eq!(join_url("http://h:1/", "/a"), "http://h:1/a");
        assert_eq!(join_url("http://h:1/api//", "a"), "http://h:1/api/a");
    }

    #[test]
    fn names_accept_object_or_array() {
        let object = json!({"blip": {"size": 1}, "florence": {}});
        assert_eq!(names_from(&object), ["blip", "florence"]);

        let array = json!(["short", {"name": "long"}, 3]);
        assert_eq!(names_from(&array), ["short", "long"]);

        assert!(names_from(&json!(null)).is_empty());
    }

    #[test]
    fn status_maps_and_tolerates_missing_fields() {
        let raw = json!({
            "processed_files": 2,
            "total_files": 4,
            "captioned_files": 1,
            "file_statuses": {"/data/cat.jpg": {"message": "a cat"}}
        });
        let status: JobStatus = serde_json::from_value::<StatusResponse>(raw).unwrap().into();

        assert_eq!(status.processed_count, 2);
        assert_eq!(status.error_count, 0);
        assert!(!status.is_complete());
        assert!((status.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(status.per_file_status["/data/cat.jpg"].message, "a cat");

        let done = JobStatus {
            processed_count: 4,
            total_count: 4,
            ..JobStatus::default()
        };
        assert!(done.is_complete());
    }

    #[tokio::test]
    async fn unreachable_service_is_remote_unavailable() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let client = CaptionServiceClient::new("http://127.0.0.1:9").unwrap();
        let err = client.list_models().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
    }
}
