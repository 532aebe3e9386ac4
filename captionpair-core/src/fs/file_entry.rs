//! `src/fs/file_entry.rs`
//! ============================================================
//! Immutable directory listing records.
//!
//! A [`FileEntry`] is a snapshot taken at listing time; nothing here
//! re-reads the filesystem once the entry is built.

use std::{
    fs::Metadata,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytesize::ByteSize;
use chrono::{DateTime, Local, TimeZone};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::fs as tokio_fs;

use crate::error::{AppError, AppResult};

/// Split a file name into `(base_name, extension)` at its last dot.
///
/// Names without a dot have an empty extension.
#[must_use]
pub fn split_file_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((name, ""))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: CompactString,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileEntry {
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let name = CompactString::new(
            path.file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
        );

        Self {
            path,
            name,
            size,
            modified,
        }
    }

    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let meta: Metadata = tokio_fs::metadata(path)
            .await
            .map_err(|e| AppError::io("stat", path, e))?;

        Ok(Self::from_meta(path, &meta))
    }

    #[must_use]
    pub fn from_meta(path: &Path, meta: &Metadata) -> Self {
        Self::new(
            path.to_path_buf(),
            meta.len(),
            meta.modified().unwrap_or(UNIX_EPOCH),
        )
    }

    /// File name with its last extension removed.
    #[inline]
    #[must_use]
    pub fn base_name(&self) -> &str {
        split_file_name(&self.name).0
    }

    /// Extension as written on disk, without the dot.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &str {
        split_file_name(&self.name).1
    }

    /// Same file, renamed within its directory. Size and timestamp carry over.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Self {
        let path = self
            .path
            .parent()
            .map_or_else(|| PathBuf::from(new_name), |dir| dir.join(new_name));

        Self {
            path,
            name: CompactString::new(new_name),
            size: self.size,
            modified: self.modified,
        }
    }

    #[inline]
    #[must_use]
    pub fn size_human(&self) -> String {
        ByteSize::b(self.size).to_string()
    }

    #[expect(clippy::cast_possible_wrap, reason = "Timestamps fit in i64")]
    #[must_use]
    pub fn format_date(&self, fmt: &str) -> String {
        let dur: Duration = self
            .modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);

        let dt: DateTime<Local> = Local
            .timestamp_opt(dur.as_secs() as i64, dur.subsec_nanos())
            .single()
            .unwrap_or_else(Local::now);

        dt.format(fmt).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_last_dot() {
        assert_eq!(split_file_name("a.tar.jpg"), ("a.tar", "jpg"));
        assert_eq!(split_file_name("photo.PNG"), ("photo", "PNG"));
        assert_eq!(split_file_name("README"), ("README", ""));
        assert_eq!(split_file_name(".hidden"), ("", "hidden"));
    }

    #[test]
    fn renamed_keeps_directory_and_metadata() {
        let entry = FileEntry::new(PathBuf::from("/l/cat.jpg"), 42, UNIX_EPOCH);
        let renamed = entry.renamed("dog.jpg");

        assert_eq!(renamed.path, PathBuf::from("/l/dog.jpg"));
        assert_eq!(renamed.name, "dog.jpg");
        assert_eq!(renamed.base_name(), "dog");
        assert_eq!(renamed.size, 42);
        assert_eq!(renamed.modified, UNIX_EPOCH);
    }

    #[tokio::test]
    async fn from_path_reads_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        tokio_fs::write(&path, "hello").await.unwrap();

        let entry = FileEntry::from_path(&path).await.unwrap();
        assert_eq!(entry.name, "note.txt");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.extension(), "txt");
    }

    #[tokio::test]
    async fn from_path_missing_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = FileEntry::from_path(&dir.path().join("nope.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
