//! `src/operators/file_system_operator.rs`
//!
//! Filesystem collaborator used by the session for every disk access.
//!
//! The core only talks to the [`FileSystem`] trait; [`LocalFileSystem`] is the
//! `tokio::fs` implementation. Tests substitute their own implementations to
//! inject failures.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs as TokioFs;
use tracing::{debug, info, instrument, warn};

use crate::config::DeletePolicy;
use crate::error::{AppError, AppResult};
use crate::fs::{dir_scanner, file_entry::FileEntry};

/// Name of the sub-directory that receives trashed files.
pub const TRASH_DIR_NAME: &str = "trash";

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn list_directory(&self, path: &Path) -> AppResult<Vec<FileEntry>>;

    async fn read_text_file(&self, path: &Path) -> AppResult<String>;

    /// Create or overwrite `path` and return its new snapshot.
    async fn write_text_file(&self, path: &Path, content: &str) -> AppResult<FileEntry>;

    /// Copy `src` to `dst`. An existing `dst` is never overwritten.
    async fn copy_file(&self, src: &Path, dst: &Path) -> AppResult<FileEntry>;

    /// Remove `path`, or move it aside, depending on the delete policy.
    async fn delete_file(&self, path: &Path) -> AppResult<()>;

    /// Rename `path` to `new_name` within the same directory.
    async fn rename_file(&self, path: &Path, new_name: &str) -> AppResult<()>;

    /// Snapshot of an existing file. A missing file is `NotFound`.
    async fn stat_file(&self, path: &Path) -> AppResult<FileEntry>;

    /// Undo [`FileSystem::delete_file`] for `path` when the delete policy
    /// allows it. Returns `false` when the file cannot be brought back.
    async fn restore_deleted(&self, path: &Path) -> AppResult<bool>;
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    delete_policy: DeletePolicy,
}

impl LocalFileSystem {
    #[must_use]
    pub const fn new(delete_policy: DeletePolicy) -> Self {
        Self { delete_policy }
    }

    #[must_use]
    pub const fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    fn sibling(path: &Path, name: &str) -> PathBuf {
        path.parent()
            .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
    }

    async fn ensure_exists(operation: &'static str, path: &Path) -> AppResult<()> {
        match TokioFs::try_exists(path).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::not_found("File", path.display().to_string())),
            Err(e) => Err(AppError::io(operation, path, e)),
        }
    }

    async fn ensure_vacant(path: &Path) -> AppResult<()> {
        if TokioFs::try_exists(path).await.unwrap_or(false) {
            return Err(AppError::conflict(
                path.display().to_string(),
                "destination file already exists",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn list_directory(&self, path: &Path) -> AppResult<Vec<FileEntry>> {
        dir_scanner::list_directory(path).await
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    async fn read_text_file(&self, path: &Path) -> AppResult<String> {
        TokioFs::read_to_string(path)
            .await
            .map_err(|e| AppError::io("read", path, e))
    }

    #[instrument(level = "debug", skip(self, content), fields(path = %path.display(), bytes = content.len()))]
    async fn write_text_file(&self, path: &Path, content: &str) -> AppResult<FileEntry> {
        TokioFs::write(path, content)
            .await
            .map_err(|e| AppError::io("write", path, e))?;

        info!(path = %path.display(), "Caption file saved");
        FileEntry::from_path(path).await
    }

    #[instrument(level = "debug", skip(self), fields(src = %src.display(), dst = %dst.display()))]
    async fn copy_file(&self, src: &Path, dst: &Path) -> AppResult<FileEntry> {
        Self::ensure_exists("copy", src).await?;
        Self::ensure_vacant(dst).await?;

        TokioFs::copy(src, dst)
            .await
            .map_err(|e| AppError::io("copy", dst, e))?;

        info!(src = %src.display(), dst = %dst.display(), "File copied");
        FileEntry::from_path(dst).await
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.display(), policy = ?self.delete_policy))]
    async fn delete_file(&self, path: &Path) -> AppResult<()> {
        Self::ensure_exists("delete", path).await?;

        match self.delete_policy {
            DeletePolicy::Trash => {
                let trash_dir = Self::sibling(path, TRASH_DIR_NAME);
                TokioFs::create_dir_all(&trash_dir)
                    .await
                    .map_err(|e| AppError::io("create trash directory", &trash_dir, e))?;

                let file_name = path
                    .file_name()
                    .ok_or_else(|| AppError::validation("path", "path has no file name"))?;
                let target = trash_dir.join(file_name);

                if TokioFs::try_exists(&target).await.unwrap_or(false) {
                    debug!(target = %target.display(), "Replacing previously trashed file");
                }

                TokioFs::rename(path, &target)
                    .await
                    .map_err(|e| AppError::io("trash", path, e))?;
                info!(path = %path.display(), trash = %target.display(), "File trashed");
            }
            DeletePolicy::Delete => {
                TokioFs::remove_file(path)
                    .await
                    .map_err(|e| AppError::io("delete", path, e))?;
                info!(path = %path.display(), "File deleted");
            }
        }

        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    async fn rename_file(&self, path: &Path, new_name: &str) -> AppResult<()> {
        Self::ensure_exists("rename", path).await?;

        let target = Self::sibling(path, new_name);
        if target == path {
            return Ok(());
        }
        if let Err(e) = Self::ensure_vacant(&target).await {
            warn!(target = %target.display(), "Refusing to overwrite on rename");
            return Err(e);
        }

        TokioFs::rename(path, &target)
            .await
            .map_err(|e| AppError::io("rename", path, e))?;

        info!(from = %path.display(), to = %target.display(), "File renamed");
        Ok(())
    }

    async fn stat_file(&self, path: &Path) -> AppResult<FileEntry> {
        FileEntry::from_path(path).await
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.display(), policy = ?self.delete_policy))]
    async fn restore_deleted(&self, path: &Path) -> AppResult<bool> {
        if self.delete_policy == DeletePolicy::Delete {
            return Ok(false);
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::validation("path", "path has no file name"))?;
        let trashed = Self::sibling(path, TRASH_DIR_NAME).join(file_name);

        Self::ensure_exists("restore", &trashed).await?;
        Self::ensure_vacant(path).await?;

        TokioFs::rename(&trashed, path)
            .await
            .map_err(|e| AppError::io("restore", &trashed, e))?;
        info!(path = %path.display(), "File restored from trash");
        Ok(true)
    }
}
