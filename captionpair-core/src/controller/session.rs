//! src/controller/session.rs
//! ============================================================================
//! # Session: owner of the reconciled table and caption buffers
//!
//! A `Session` holds everything one comparison of two directories needs:
//! the [`MatchStore`], the per-side caption buffers, the caption clipboard,
//! the configuration and the filesystem collaborator.
//!
//! Every mutation takes `&mut self`, so two operations can never interleave
//! on the same table. The store is only updated after the collaborator calls
//! of an operation have all succeeded.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::controller::{
    actions::{Action, ActionOutcome},
    caption_job::CaptionJobState,
};
use crate::error::{AppError, AppResult, ErrorKind};
use crate::fs::file_entry::FileEntry;
use crate::model::{
    captions::{CaptionBook, CaptionBuffer, CaptionState},
    filter::TEXT_EXTENSION,
    identity::FileHash,
    match_table::{MatchStore, MatchedEntry, Side},
    mutation, reconciler,
};
use crate::operators::file_system_operator::FileSystem;

pub struct Session<F: FileSystem> {
    pub(crate) config: Config,
    pub(crate) fs: F,
    pub(crate) store: MatchStore,
    pub(crate) captions: CaptionBook,
    pub(crate) clipboard: Option<(FileHash, Side)>,
    pub(crate) caption_job: CaptionJobState,
}

impl<F: FileSystem> Session<F> {
    #[must_use]
    pub fn new(config: Config, fs: F) -> Self {
        Self {
            config,
            fs,
            store: MatchStore::new(),
            captions: CaptionBook::new(),
            clipboard: None,
            caption_job: CaptionJobState::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &MatchStore {
        &self.store
    }

    #[must_use]
    pub const fn captions(&self) -> &CaptionBook {
        &self.captions
    }

    pub fn entry(&self, hash: FileHash) -> AppResult<&MatchedEntry> {
        self.store.resolve(hash)
    }

    /// The configured directory of `side`.
    pub fn directory(&self, side: Side) -> AppResult<PathBuf> {
        let (left, right) = self.config.directories()?;
        Ok(match side {
            Side::Left => left,
            Side::Right => right,
        })
    }

    #[must_use]
    pub fn caption_text(&self, hash: FileHash, side: Side) -> &str {
        self.captions.text(hash, side)
    }

    #[must_use]
    pub fn caption_state(&self, hash: FileHash, side: Side) -> CaptionState {
        self.captions.state(hash, side)
    }

    /// Re-list both directories and rebuild table, index and captions.
    #[instrument(level = "info", skip(self))]
    pub async fn read_directories(&mut self, pattern: &str) -> AppResult<usize> {
        let (left_dir, right_dir) = self.config.directories()?;

        let left = self.fs.list_directory(&left_dir).await?;
        let right = self.fs.list_directory(&right_dir).await?;

        self.store = reconciler::reconcile(&left, &right, pattern);
        self.captions.clear();
        self.clipboard = None;
        self.load_captions().await;

        Ok(self.store.len())
    }

    /// Read every attached caption file into a clean buffer.
    ///
    /// Sides with media but no caption file get an empty buffer. A caption
    /// that cannot be read is logged and left without a buffer.
    pub async fn load_captions(&mut self) {
        let mut pending: Vec<(FileHash, Side, Option<PathBuf>)> = Vec::new();
        for entry in self.store.iter() {
            for side in Side::BOTH {
                let files = entry.side(side);
                if files.media.is_some() {
                    pending.push((entry.hash, side, files.text.as_ref().map(|t| t.path.clone())));
                }
            }
        }

        let mut loaded = 0usize;
        for (hash, side, text_path) in pending {
            let Some(path) = text_path else {
                self.captions.insert(hash, side, CaptionBuffer::default());
                continue;
            };

            match self.fs.read_text_file(&path).await {
                Ok(content) => {
                    self.captions.insert(hash, side, CaptionBuffer::loaded(content));
                    loaded += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Could not read caption"),
            }
        }

        debug!(loaded, "Captions loaded");
    }

    fn require_media(&self, hash: FileHash, side: Side) -> AppResult<&FileEntry> {
        let entry = self.store.resolve(hash)?;
        entry
            .side(side)
            .media
            .as_ref()
            .ok_or_else(|| AppError::not_found("Media", format!("{} ({side})", entry.base_name)))
    }

    /// Rename one side's media and caption file, keeping the hash.
    ///
    /// Returns `None` when the name is unchanged.
    #[instrument(level = "info", skip(self), fields(hash = %hash, side = %side))]
    pub async fn rename(
        &mut self,
        hash: FileHash,
        side: Side,
        new_base_name: &str,
    ) -> AppResult<Option<CompactString>> {
        let Some(plan) = mutation::plan_rename(&self.store, hash, side, new_base_name)? else {
            return Ok(None);
        };

        self.fs
            .rename_file(&plan.media.from, &plan.media.new_name)
            .await?;

        if let Some(step) = &plan.text {
            if let Err(e) = self.fs.rename_file(&step.from, &step.new_name).await {
                self.undo_media_rename(&plan.media.from, &plan.media.new_name).await;
                return Err(e);
            }
        }

        let entry = mutation::commit_rename(&mut self.store, &plan)?;
        info!(
            marker = "ENTRY_RENAMED",
            operation_type = "rename",
            new_base_name = %entry.base_name,
            "Entry renamed"
        );

        Ok(Some(plan.new_base))
    }

    async fn undo_media_rename(&self, original: &Path, new_name: &str) {
        let renamed = original
            .parent()
            .map_or_else(|| PathBuf::from(new_name), |dir| dir.join(new_name));
        let Some(original_name) = original.file_name().and_then(|n| n.to_str()) else {
            return;
        };

        if let Err(e) = self.fs.rename_file(&renamed, original_name).await {
            warn!(
                path = %renamed.display(),
                error = %e,
                "Could not restore media name after failed caption rename"
            );
        }
    }

    /// Copy media and the current caption text to the other side.
    #[instrument(level = "info", skip(self), fields(hash = %hash, side = %side))]
    pub async fn copy_to_other_side(&mut self, hash: FileHash, side: Side) -> AppResult<Side> {
        let dest_dir = self.directory(side.other())?;
        let plan = mutation::plan_copy(&self.store, hash, side, &dest_dir)?;
        let text = self.captions.text(hash, side).to_owned();

        // A caption left behind by filtered-out media is not ours to replace
        match self.fs.stat_file(&plan.text_dest).await {
            Ok(_) => {
                return Err(AppError::conflict(
                    plan.text_dest.display().to_string(),
                    "destination caption file already exists",
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let media = self.fs.copy_file(&plan.media_source, &plan.media_dest).await?;

        let text_entry = match self.fs.write_text_file(&plan.text_dest, &text).await {
            Ok(entry) => entry,
            Err(e) => {
                if let Err(cleanup) = self.fs.delete_file(&plan.media_dest).await {
                    warn!(
                        path = %plan.media_dest.display(),
                        error = %cleanup,
                        "Could not remove copied media after failed caption write"
                    );
                }
                return Err(e);
            }
        };

        mutation::commit_copy(&mut self.store, &plan, media, text_entry)?;
        self.captions.insert(hash, plan.to, CaptionBuffer::loaded(text));

        info!(
            marker = "ENTRY_COPIED",
            operation_type = "copy",
            to = %plan.to,
            "Copied to other side"
        );
        Ok(plan.to)
    }

    /// Delete (or trash) one side's media and caption file.
    ///
    /// The caption goes first. If the media delete then fails, the caption
    /// is brought back so the entry and the disk stay as they were.
    #[instrument(level = "info", skip(self), fields(hash = %hash, side = %side))]
    pub async fn delete(&mut self, hash: FileHash, side: Side) -> AppResult<()> {
        let plan = mutation::plan_delete(&self.store, hash, side)?;

        let mut backup = None;
        if let Some(text) = &plan.text {
            backup = self.fs.read_text_file(text).await.ok();
            self.fs.delete_file(text).await?;
        }

        if let Err(e) = self.fs.delete_file(&plan.media).await {
            if let Some(text) = &plan.text {
                self.restore_caption(text, backup.as_deref()).await;
            }
            return Err(e);
        }

        mutation::commit_delete(&mut self.store, &plan)?;
        self.captions.remove(hash, side);

        info!(marker = "ENTRY_DELETED", operation_type = "delete", "Side deleted");
        Ok(())
    }

    async fn restore_caption(&self, path: &Path, content: Option<&str>) {
        let restored = match self.fs.restore_deleted(path).await {
            Ok(true) => Ok(()),
            Ok(false) => match content {
                Some(content) => self.fs.write_text_file(path, content).await.map(|_| ()),
                None => Err(AppError::not_found("Caption backup", path.display().to_string())),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = restored {
            warn!(
                path = %path.display(),
                error = %e,
                "Could not restore caption after failed media delete"
            );
        }
    }

    pub fn edit_caption(&mut self, hash: FileHash, side: Side, text: impl Into<String>) -> AppResult<()> {
        self.require_media(hash, side)?;
        self.captions.get_or_default(hash, side).edit(text);
        Ok(())
    }

    /// Write the current caption text to the side's caption file, creating
    /// `<base>.txt` beside the media file when none is attached.
    #[instrument(level = "debug", skip(self), fields(hash = %hash, side = %side))]
    pub async fn save_caption(&mut self, hash: FileHash, side: Side) -> AppResult<FileEntry> {
        let media = self.require_media(hash, side)?;
        let target = match &self.store.resolve(hash)?.side(side).text {
            Some(text) => text.path.clone(),
            None => media
                .path
                .with_file_name(format!("{}.{TEXT_EXTENSION}", media.base_name())),
        };

        let text = self.captions.text(hash, side).to_owned();
        let written = self.fs.write_text_file(&target, &text).await?;

        self.store.resolve_mut(hash)?.side_mut(side).text = Some(written.clone());
        self.captions.get_or_default(hash, side).mark_saved();

        Ok(written)
    }

    /// Save every dirty caption. Returns how many were written.
    pub async fn save_dirty_captions(&mut self) -> AppResult<usize> {
        let dirty = self.captions.dirty_keys();
        if dirty.is_empty() {
            return Err(AppError::validation("captions", "no edited captions to update"));
        }

        let mut count = 0;
        for (hash, side) in dirty {
            self.save_caption(hash, side).await?;
            count += 1;
        }

        info!(count, "Dirty captions saved");
        Ok(count)
    }

    pub fn copy_caption_from(&mut self, hash: FileHash, side: Side) -> AppResult<()> {
        self.require_media(hash, side)?;
        self.clipboard = Some((hash, side));
        Ok(())
    }

    pub fn paste_caption_to(&mut self, hash: FileHash, side: Side) -> AppResult<()> {
        let (src_hash, src_side) = self
            .clipboard
            .ok_or_else(|| AppError::validation("clipboard", "no caption has been copied"))?;
        self.require_media(hash, side)?;

        let text = self.captions.text(src_hash, src_side).to_owned();
        self.captions.get_or_default(hash, side).edit(text);
        Ok(())
    }

    /// Execute one action. Actions run strictly one after another.
    pub async fn dispatch(&mut self, action: Action) -> AppResult<ActionOutcome> {
        debug!(action = action.name(), "Dispatching action");

        let outcome = match action {
            Action::ReadDirectories { pattern } => ActionOutcome::Listed {
                entries: self.read_directories(&pattern).await?,
            },
            Action::Rename {
                hash,
                side,
                new_base_name,
            } => ActionOutcome::Renamed {
                new_base_name: self.rename(hash, side, &new_base_name).await?,
            },
            Action::CopyToOtherSide { hash, side } => ActionOutcome::Copied {
                to: self.copy_to_other_side(hash, side).await?,
            },
            Action::Delete { hash, side } => {
                self.delete(hash, side).await?;
                ActionOutcome::Deleted
            }
            Action::EditCaption { hash, side, text } => {
                self.edit_caption(hash, side, text)?;
                ActionOutcome::CaptionEdited
            }
            Action::SaveCaption { hash, side } => {
                self.save_caption(hash, side).await?;
                ActionOutcome::CaptionSaved
            }
            Action::SaveDirtyCaptions => ActionOutcome::CaptionsSaved {
                count: self.save_dirty_captions().await?,
            },
            Action::CopyCaptionFrom { hash, side } => {
                self.copy_caption_from(hash, side)?;
                ActionOutcome::CaptionCopied
            }
            Action::PasteCaptionTo { hash, side } => {
                self.paste_caption_to(hash, side)?;
                ActionOutcome::CaptionPasted
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeletePolicy;
    use crate::operators::file_system_operator::LocalFileSystem;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        left: PathBuf,
        right: PathBuf,
    }

    fn fixture(left_files: &[(&str, &str)], right_files: &[(&str, &str)]) -> Fixture {
        let root = TempDir::new().unwrap();
        let left = root.path().join("left");
        let right = root.path().join("right");
        std::fs::create_dir_all(&left).unwrap();
        std::fs::create_dir_all(&right).unwrap();
        for (name, content) in left_files {
            std::fs::write(left.join(name), content).unwrap();
        }
        for (name, content) in right_files {
            std::fs::write(right.join(name), content).unwrap();
        }
        Fixture {
            _root: root,
            left,
            right,
        }
    }

    fn config(fx: &Fixture) -> Config {
        Config::default().with_directories(
            Some(fx.left.display().to_string()),
            Some(fx.right.display().to_string()),
        )
    }

    async fn session<F: FileSystem>(fx: &Fixture, fs: F) -> Session<F> {
        let mut session = Session::new(config(fx), fs);
        session.read_directories("").await.unwrap();
        session
    }

    #[tokio::test]
    async fn read_requires_both_directories() {
        let mut session = Session::new(Config::default(), LocalFileSystem::default());
        let err = session.read_directories("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[tokio::test]
    async fn read_loads_captions() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "a cat")], &[("a.jpg", "img")]);
        let session = session(&fx, LocalFileSystem::default()).await;
        let hash = FileHash::of("a");

        assert_eq!(session.store().len(), 1);
        assert_eq!(session.caption_text(hash, Side::Left), "a cat");
        assert_eq!(session.caption_state(hash, Side::Left), CaptionState::Clean);
        assert_eq!(session.caption_state(hash, Side::Right), CaptionState::Clean);
        assert_eq!(session.caption_text(hash, Side::Right), "");
    }

    #[tokio::test]
    async fn rename_moves_both_files() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "cap")], &[]);
        let mut session = session(&fx, LocalFileSystem::default()).await;
        let hash = FileHash::of("a");

        let renamed = session.rename(hash, Side::Left, "b").await.unwrap();
        assert_eq!(renamed.as_deref(), Some("b"));
        assert!(fx.left.join("b.jpg").exists());
        assert!(fx.left.join("b.txt").exists());
        assert!(!fx.left.join("a.jpg").exists());

        let entry = session.entry(hash).unwrap();
        assert_eq!(entry.base_name, "b");
        assert_eq!(session.caption_text(hash, Side::Left), "cap");

        // Same name again is a no-op
        assert_eq!(session.rename(hash, Side::Left, "b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn copy_writes_current_caption() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "saved")], &[]);
        let mut session = session(&fx, LocalFileSystem::default()).await;
        let hash = FileHash::of("a");

        session.edit_caption(hash, Side::Left, "edited").unwrap();
        assert_eq!(session.copy_to_other_side(hash, Side::Left).await.unwrap(), Side::Right);

        assert_eq!(std::fs::read_to_string(fx.right.join("a.jpg")).unwrap(), "img");
        assert_eq!(std::fs::read_to_string(fx.right.join("a.txt")).unwrap(), "edited");
        // Source caption file untouched and still dirty
        assert_eq!(std::fs::read_to_string(fx.left.join("a.txt")).unwrap(), "saved");
        assert_eq!(session.caption_state(hash, Side::Left), CaptionState::Dirty);
        assert_eq!(session.caption_state(hash, Side::Right), CaptionState::Clean);

        let err = session.copy_to_other_side(hash, Side::Left).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn delete_keeps_empty_record() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "cap")], &[]);
        let mut session = session(&fx, LocalFileSystem::default()).await;
        let hash = FileHash::of("a");

        session.delete(hash, Side::Left).await.unwrap();
        assert!(!fx.left.join("a.jpg").exists());
        assert!(!fx.left.join("a.txt").exists());

        let entry = session.entry(hash).unwrap();
        assert!(entry.left.is_empty() && entry.right.is_empty());
        assert_eq!(session.caption_state(hash, Side::Left), CaptionState::Absent);
    }

    #[tokio::test]
    async fn save_creates_missing_caption_file() {
        let fx = fixture(&[("a.png", "img")], &[]);
        let mut session = session(&fx, LocalFileSystem::default()).await;
        let hash = FileHash::of("a");

        let err = session.save_dirty_captions().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);

        session.edit_caption(hash, Side::Left, "new").unwrap();
        assert_eq!(session.save_dirty_captions().await.unwrap(), 1);

        assert_eq!(std::fs::read_to_string(fx.left.join("a.txt")).unwrap(), "new");
        assert!(session.entry(hash).unwrap().left.text.is_some());
        assert_eq!(session.caption_state(hash, Side::Left), CaptionState::Clean);
    }

    #[tokio::test]
    async fn caption_clipboard() {
        let fx = fixture(&[("a.jpg", "x"), ("a.txt", "left cap")], &[("b.jpg", "y")]);
        let mut session = session(&fx, LocalFileSystem::default()).await;
        let a = FileHash::of("a");
        let b = FileHash::of("b");

        let err = session.paste_caption_to(b, Side::Right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);

        session.copy_caption_from(a, Side::Left).unwrap();
        session.paste_caption_to(b, Side::Right).unwrap();
        assert_eq!(session.caption_text(b, Side::Right), "left cap");
        assert_eq!(session.caption_state(b, Side::Right), CaptionState::Dirty);

        let err = session.paste_caption_to(b, Side::Left).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    /// Local disk, except that renames or deletes of one extension fail.
    struct Faulty {
        inner: LocalFileSystem,
        extension: &'static str,
        fail_rename: bool,
        fail_delete: bool,
    }

    impl Faulty {
        fn deletes(extension: &'static str, policy: DeletePolicy) -> Self {
            Self {
                inner: LocalFileSystem::new(policy),
                extension,
                fail_rename: false,
                fail_delete: true,
            }
        }

        fn renames(extension: &'static str) -> Self {
            Self {
                inner: LocalFileSystem::default(),
                extension,
                fail_rename: true,
                fail_delete: false,
            }
        }

        fn hit(&self, path: &Path) -> bool {
            path.extension().is_some_and(|e| e == self.extension)
        }
    }

    #[async_trait]
    impl FileSystem for Faulty {
        async fn list_directory(&self, path: &Path) -> AppResult<Vec<FileEntry>> {
            self.inner.list_directory(path).await
        }
        async fn read_text_file(&self, path: &Path) -> AppResult<String> {
            self.inner.read_text_file(path).await
        }
        async fn write_text_file(&self, path: &Path, content: &str) -> AppResult<FileEntry> {
            self.inner.write_text_file(path, content).await
        }
        async fn copy_file(&self, src: &Path, dst: &Path) -> AppResult<FileEntry> {
            self.inner.copy_file(src, dst).await
        }
        async fn delete_file(&self, path: &Path) -> AppResult<()> {
            if self.fail_delete && self.hit(path) {
                return Err(AppError::io("delete", path, std::io::Error::other("denied")));
            }
            self.inner.delete_file(path).await
        }
        async fn rename_file(&self, path: &Path, new_name: &str) -> AppResult<()> {
            if self.fail_rename && self.hit(path) {
                return Err(AppError::io("rename", path, std::io::Error::other("denied")));
            }
            self.inner.rename_file(path, new_name).await
        }
        async fn stat_file(&self, path: &Path) -> AppResult<FileEntry> {
            self.inner.stat_file(path).await
        }
        async fn restore_deleted(&self, path: &Path) -> AppResult<bool> {
            self.inner.restore_deleted(path).await
        }
    }

    #[tokio::test]
    async fn failed_caption_rename_restores_media() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "cap")], &[]);
        let mut session = session(&fx, Faulty::renames("txt")).await;
        let hash = FileHash::of("a");

        let err = session.rename(hash, Side::Left, "b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);

        assert!(fx.left.join("a.jpg").exists());
        assert!(!fx.left.join("b.jpg").exists());
        assert_eq!(session.entry(hash).unwrap().base_name, "a");
        assert!(session.store().is_consistent());
    }

    #[tokio::test]
    async fn failed_caption_delete_leaves_entry_untouched() {
        let fx = fixture(&[("a.jpg", "img"), ("a.txt", "cap")], &[]);
        let mut session = session(&fx, Faulty::deletes("txt", DeletePolicy::Delete)).await;
        let hash = FileHash::of("a");
        let before = session.entry(hash).unwrap().clone();

        assert!(session.delete(hash, Side::Left).await.is_err());

        assert_eq!(session.entry(hash).unwrap(), &before);
        assert!(fx.left.join("a.jpg").exists());
        assert!(fx.left.join("a.txt").exists());
    }

    #[tokio::test]
    async fn failed_media_delete_brings_caption_back() {
        for policy in [DeletePolicy::Delete, DeletePolicy::Trash] {
            let fx = fixture(&[("a.jpg", "img"), ("a.txt", "cap")], &[]);
            let mut session = session(&fx, Faulty::deletes("jpg", policy)).await;
            let hash = FileHash::of("a");
            let before = session.entry(hash).unwrap().clone();

            let err = session.delete(hash, Side::Left).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::IoFailure);

            assert_eq!(session.entry(hash).unwrap(), &before, "{policy:?}");
            assert_eq!(std::fs::read_to_string(fx.left.join("a.txt")).unwrap(), "cap");
            assert!(!fx.left.join("trash").join("a.txt").exists(), "{policy:?}");
            assert_eq!(session.caption_state(hash, Side::Left), CaptionState::Clean);
        }
    }

    #[tokio::test]
    async fn copy_refuses_to_replace_a_foreign_caption() {
        // Right `cat.jpg` is filtered out, its caption file is still on disk
        let fx = fixture(&[("cat.png", "img")], &[("cat.jpg", "other"), ("cat.txt", "precious")]);
        let mut session = Session::new(config(&fx), LocalFileSystem::default());
        session.read_directories("cat.png").await.unwrap();
        let hash = FileHash::of("cat");
        assert!(session.entry(hash).unwrap().right.is_empty());

        let err = session.copy_to_other_side(hash, Side::Left).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(std::fs::read_to_string(fx.right.join("cat.txt")).unwrap(), "precious");
        assert!(!fx.right.join("cat.png").exists());
        assert!(session.entry(hash).unwrap().right.is_empty());
    }

    #[tokio::test]
    async fn dispatch_runs_actions_in_order() {
        let fx = fixture(&[("a.jpg", "img")], &[]);
        let mut session = Session::new(config(&fx), LocalFileSystem::default());
        let hash = FileHash::of("a");

        let outcomes = [
            Action::ReadDirectories {
                pattern: String::new(),
            },
            Action::EditCaption {
                hash,
                side: Side::Left,
                text: "hi".into(),
            },
            Action::SaveDirtyCaptions,
            Action::CopyToOtherSide {
                hash,
                side: Side::Left,
            },
        ];

        let mut results = Vec::new();
        for action in outcomes {
            results.push(session.dispatch(action).await.unwrap());
        }

        assert_eq!(
            results,
            [
                ActionOutcome::Listed { entries: 1 },
                ActionOutcome::CaptionEdited,
                ActionOutcome::CaptionsSaved { count: 1 },
                ActionOutcome::Copied { to: Side::Right },
            ]
        );
        assert_eq!(std::fs::read_to_string(fx.right.join("a.txt")).unwrap(), "hi");
    }
}
