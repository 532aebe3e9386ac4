//! `src/model/reconciler.rs`
//!
//! Joins the flat listings of both sides into a [`MatchStore`], keyed by
//! base name.
//!
//! Only media files decide which base names are included on a side. Caption
//! text files follow an accepted media base name and never bring one in on
//! their own.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::fs::file_entry::FileEntry;
use crate::model::{
    filter::{FilterPattern, is_media_extension, is_text_extension},
    match_table::{FileKind, MatchStore, Side},
};

/// Classify a file by its extension. `None` means the file is ignored.
#[must_use]
pub fn classify(extension: &str) -> Option<FileKind> {
    if is_text_extension(extension) {
        Some(FileKind::Text)
    } else if is_media_extension(extension) {
        Some(FileKind::Media)
    } else {
        None
    }
}

/// Base names of `entries` with at least one media file passing `filter`.
fn accepted_base_names<'a>(entries: &'a [FileEntry], filter: &FilterPattern) -> HashSet<&'a str> {
    entries
        .iter()
        .filter(|f| classify(f.extension()) == Some(FileKind::Media))
        .filter(|f| filter.matches(f.base_name(), f.extension()))
        .map(FileEntry::base_name)
        .collect()
}

fn attach_side(store: &mut MatchStore, side: Side, entries: &[FileEntry], filter: &FilterPattern) {
    let accepted = accepted_base_names(entries, filter);

    for file in entries {
        if !accepted.contains(file.base_name()) {
            continue;
        }
        let Some(kind) = classify(file.extension()) else {
            continue;
        };

        let slot = store
            .entry_or_insert(file.base_name())
            .side_mut(side)
            .slot_mut(kind);

        // First file in listing order wins (e.g. `a.jpg` over `a.png`)
        if let Some(existing) = slot.as_ref() {
            debug!(
                side = %side,
                kept = %existing.name,
                skipped = %file.name,
                "Duplicate attachment for base name"
            );
            continue;
        }
        *slot = Some(file.clone());
    }
}

/// Build a fresh store from both listings and a search-box pattern.
pub fn reconcile(left: &[FileEntry], right: &[FileEntry], pattern: &str) -> MatchStore {
    let filter = FilterPattern::parse(pattern);
    let mut store = MatchStore::new();

    attach_side(&mut store, Side::Left, left, &filter);
    attach_side(&mut store, Side::Right, right, &filter);

    info!(
        marker = "RECONCILED",
        operation_type = "reconcile",
        left_files = left.len(),
        right_files = right.len(),
        entries = store.len(),
        pattern,
        "Reconciled directory listings"
    );

    store
}
