//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Asynchronous Flat Listing
//!
//! Lists the regular files of one directory as [`FileEntry`] snapshots.
//! Sub-directories (including the `trash` folder) are never descended into.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use tokio::fs::{self, ReadDir};
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::fs::file_entry::FileEntry;

/// Scans the given directory and returns its regular files sorted by name.
#[instrument(level = "debug", fields(path = %path.display()))]
pub async fn list_directory(path: &Path) -> AppResult<Vec<FileEntry>> {
    let start_time = Instant::now();

    let mut entries: Vec<FileEntry> = Vec::new();
    let mut read_dir: ReadDir = fs::read_dir(path)
        .await
        .map_err(|e| AppError::io("list", path, e))?;

    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| AppError::io("list", path, e))?
    {
        let entry_path: PathBuf = entry.path();

        // Follows symlinks so linked media is listed like a regular file
        match fs::metadata(&entry_path).await {
            Ok(meta) if meta.is_file() => entries.push(FileEntry::from_meta(&entry_path, &meta)),
            Ok(_) => {}
            Err(e) => {
                // Skip unreadable entries instead of failing the whole listing
                debug!("Failed to stat {:?}: {}", entry_path, e);
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        marker = "DIRECTORY_LISTED",
        operation_type = "list_directory",
        entries = entries.len(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Listed {}",
        path.display()
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lists_files_sorted_and_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.jpg"), b"b").await.unwrap();
        fs::write(dir.path().join("a.jpg"), b"aa").await.unwrap();
        fs::write(dir.path().join("a.txt"), b"caption").await.unwrap();
        fs::create_dir(dir.path().join("trash")).await.unwrap();

        let entries = list_directory(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, ["a.jpg", "a.txt", "b.jpg"]);
        assert_eq!(entries[0].size, 2);
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = list_directory(&dir.path().join("absent")).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
