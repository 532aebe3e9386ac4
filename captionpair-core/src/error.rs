//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Caption Pairing Core
//!
//! Every fallible operation in the crate returns `AppResult<T>`. Variants are
//! grouped by the failure taxonomy callers branch on (see [`ErrorKind`]); each
//! carries enough context to be shown to the user as a single notification.

use std::{io, path::Path};
use thiserror::Error;

/// Convenient alias carrying the unified error type.
pub type AppResult<T> = Result<T, AppError>;

/// Coarse failure class, independent of the payload carried by [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    IoFailure,
    Conflict,
    RemoteUnavailable,
    ValidationFailure,
    Config,
}

/// Unified error type for all reconciliation, mutation and collaborator calls.
#[derive(Debug, Error)]
pub enum AppError {
    /// A path, hash or base name could not be resolved.
    #[error("{what} not found: {target}")]
    NotFound { what: &'static str, target: String },

    /// The underlying read/write/copy/delete/rename failed.
    #[error("File operation '{operation}' failed on {path}: {source}")]
    Io {
        operation: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },

    /// The destination is already occupied.
    #[error("Conflict on {target}: {reason}")]
    Conflict { target: String, reason: String },

    /// The caption service is unreachable or answered with a non-success status.
    #[error("Caption service unavailable at {url}: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    /// Missing or empty user input.
    #[error("Invalid input: {field} - {message}")]
    ValidationFailure { field: &'static str, message: String },

    /// Malformed configuration file.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// No platform configuration directory could be determined.
    #[error("Could not determine config directory")]
    ConfigDir,
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            Self::ValidationFailure { .. } => ErrorKind::ValidationFailure,
            Self::Config(_) | Self::ConfigDir => ErrorKind::Config,
        }
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(what: &'static str, target: S) -> Self {
        Self::NotFound {
            what,
            target: target.into(),
        }
    }

    /// Wrap an I/O failure. `NotFound` kinds are lifted into [`AppError::NotFound`].
    pub fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::not_found("File", path.display().to_string());
        }

        Self::Io {
            operation,
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a conflict error
    pub fn conflict<S1: Into<String>, S2: Into<String>>(target: S1, reason: S2) -> Self {
        Self::Conflict {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote-unavailable error
    pub fn remote_unavailable<S1: Into<String>, S2: Into<String>>(url: S1, reason: S2) -> Self {
        Self::RemoteUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn validation<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self::ValidationFailure {
            field,
            message: message.into(),
        }
    }
}
