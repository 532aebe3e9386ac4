//! `src/model/mutation.rs`
//! ============================================================================
//! # Mutation Layer: rename / copy / delete against a [`MatchStore`]
//!
//! Every operation is split in two halves:
//! - `plan_*` validates against the store and computes the paths the
//!   filesystem collaborator must touch. It never mutates.
//! - `commit_*` applies the outcome to the store once the collaborator
//!   calls have all succeeded.
//!
//! A failed collaborator call therefore leaves the entry exactly as it was.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::fs::file_entry::FileEntry;
use crate::model::{
    filter::TEXT_EXTENSION,
    identity::FileHash,
    match_table::{MatchStore, MatchedEntry, Side},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub from: PathBuf,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub hash: FileHash,
    pub side: Side,
    pub new_base: CompactString,
    pub media: RenameStep,
    pub text: Option<RenameStep>,
}

impl RenamePlan {
    /// Collaborator calls in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &RenameStep> {
        std::iter::once(&self.media).chain(self.text.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub hash: FileHash,
    pub from: Side,
    pub to: Side,
    pub media_source: PathBuf,
    pub media_dest: PathBuf,
    pub text_dest: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub hash: FileHash,
    pub side: Side,
    pub media: PathBuf,
    pub text: Option<PathBuf>,
}

fn validate_base_name(new_base: &str) -> AppResult<&str> {
    let trimmed = new_base.trim();

    if trimmed.is_empty() {
        return Err(AppError::validation("new_base_name", "name must not be empty"));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(AppError::validation(
            "new_base_name",
            format!("'{trimmed}' is not a plain file name"),
        ));
    }

    Ok(trimmed)
}

fn with_extension(base: &str, extension: &str) -> String {
    if extension.is_empty() {
        base.to_owned()
    } else {
        format!("{base}.{extension}")
    }
}

/// Plan a rename of one side's media (and caption) to `new_base`.
///
/// The old extension is kept. Returns `Ok(None)` when the name is unchanged.
pub fn plan_rename(
    store: &MatchStore,
    hash: FileHash,
    side: Side,
    new_base: &str,
) -> AppResult<Option<RenamePlan>> {
    let entry: &MatchedEntry = store.resolve(hash)?;
    let new_base = validate_base_name(new_base)?;

    let files = entry.side(side);
    let media = files
        .media
        .as_ref()
        .ok_or_else(|| AppError::not_found("Media", format!("{} ({side})", entry.base_name)))?;

    if media.base_name() == new_base {
        debug!(hash = %hash, side = %side, "Rename to the same name, nothing to do");
        return Ok(None);
    }

    if new_base != entry.base_name.as_str() && store.get(new_base).is_some() {
        return Err(AppError::conflict(
            new_base,
            "an entry with this base name already exists",
        ));
    }

    let media_step = RenameStep {
        from: media.path.clone(),
        new_name: with_extension(new_base, media.extension()),
    };
    let text_step = files.text.as_ref().map(|text| RenameStep {
        from: text.path.clone(),
        new_name: with_extension(new_base, text.extension()),
    });

    Ok(Some(RenamePlan {
        hash,
        side,
        new_base: CompactString::new(new_base),
        media: media_step,
        text: text_step,
    }))
}

/// Re-key the entry under the new base name, updating the renamed side only.
pub fn commit_rename<'a>(store: &'a mut MatchStore, plan: &RenamePlan) -> AppResult<&'a MatchedEntry> {
    let entry = store.rekey(plan.hash, &plan.new_base)?;
    let files = entry.side_mut(plan.side);

    if let Some(media) = files.media.as_mut() {
        *media = media.renamed(&plan.media.new_name);
    }
    if let (Some(text), Some(step)) = (files.text.as_mut(), plan.text.as_ref()) {
        *text = text.renamed(&step.new_name);
    }

    Ok(&*entry)
}

/// Plan copying one side's media to `dest_dir` on the other side.
///
/// The destination side must not already hold media.
pub fn plan_copy(store: &MatchStore, hash: FileHash, from: Side, dest_dir: &Path) -> AppResult<CopyPlan> {
    let entry = store.resolve(hash)?;
    let to = from.other();

    if entry.side(to).media.is_some() {
        return Err(AppError::conflict(
            format!("{} ({to})", entry.base_name),
            "other side already has this media file",
        ));
    }

    let media = entry
        .side(from)
        .media
        .as_ref()
        .ok_or_else(|| AppError::not_found("Media", format!("{} ({from})", entry.base_name)))?;

    Ok(CopyPlan {
        hash,
        from,
        to,
        media_source: media.path.clone(),
        media_dest: dest_dir.join(media.name.as_str()),
        text_dest: dest_dir.join(with_extension(media.base_name(), TEXT_EXTENSION)),
    })
}

/// Attach the freshly written destination files.
pub fn commit_copy(store: &mut MatchStore, plan: &CopyPlan, media: FileEntry, text: FileEntry) -> AppResult<()> {
    let entry = store.resolve_mut(plan.hash)?;
    let files = entry.side_mut(plan.to);

    files.media = Some(media);
    files.text = Some(text);

    Ok(())
}

/// Plan deleting one side's media and its caption file.
pub fn plan_delete(store: &MatchStore, hash: FileHash, side: Side) -> AppResult<DeletePlan> {
    let entry = store.resolve(hash)?;
    let files = entry.side(side);

    let media = files
        .media
        .as_ref()
        .ok_or_else(|| AppError::not_found("Media", format!("{} ({side})", entry.base_name)))?;

    Ok(DeletePlan {
        hash,
        side,
        media: media.path.clone(),
        text: files.text.as_ref().map(|t| t.path.clone()),
    })
}

/// Clear the side. The entry itself stays in the table, even when empty.
pub fn commit_delete(store: &mut MatchStore, plan: &DeletePlan) -> AppResult<()> {
    store.resolve_mut(plan.hash)?.side_mut(plan.side).clear();
    Ok(())
}
