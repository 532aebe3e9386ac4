//! `src/model/match_table.rs`
//! ============================================================================
//! # Match Table: reconciled left/right media and caption records
//!
//! [`MatchStore`] owns the `MatchTable` (base name -> [`MatchedEntry`]) and the
//! `HashIndex` (hash -> base name) and keeps them in lockstep. Rebuilt
//! wholesale by the reconciler, then mutated in place through the mutation
//! layer only.

use std::{
    collections::{BTreeMap, HashMap, btree_map},
    fmt,
    str::FromStr,
};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::fs::file_entry::FileEntry;
use crate::model::identity::FileHash;

/// One of the two compared directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    #[inline]
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Side {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => Err(AppError::validation(
                "side",
                format!("expected 'left' or 'right', got '{other}'"),
            )),
        }
    }
}

/// What a side attachment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Media,
    Text,
}

/// Attachments of one side of a [`MatchedEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideFiles {
    pub media: Option<FileEntry>,
    pub text: Option<FileEntry>,
}

impl SideFiles {
    #[inline]
    #[must_use]
    pub const fn get(&self, kind: FileKind) -> Option<&FileEntry> {
        match kind {
            FileKind::Media => self.media.as_ref(),
            FileKind::Text => self.text.as_ref(),
        }
    }

    #[inline]
    pub const fn slot_mut(&mut self, kind: FileKind) -> &mut Option<FileEntry> {
        match kind {
            FileKind::Media => &mut self.media,
            FileKind::Text => &mut self.text,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.media.is_none() && self.text.is_none()
    }

    pub fn clear(&mut self) {
        self.media = None;
        self.text = None;
    }
}

/// The reconciled record for one base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEntry {
    pub base_name: CompactString,
    pub hash: FileHash,
    pub left: SideFiles,
    pub right: SideFiles,
}

impl MatchedEntry {
    #[must_use]
    pub fn new(base_name: &str) -> Self {
        Self {
            base_name: CompactString::new(base_name),
            hash: FileHash::of(base_name),
            left: SideFiles::default(),
            right: SideFiles::default(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideFiles {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    #[inline]
    pub const fn side_mut(&mut self, side: Side) -> &mut SideFiles {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, side: Side, kind: FileKind) -> Option<&FileEntry> {
        self.side(side).get(kind)
    }

    #[must_use]
    pub const fn has_media(&self) -> bool {
        self.left.media.is_some() || self.right.media.is_some()
    }
}

/// `MatchTable` + `HashIndex`, kept in lockstep.
#[derive(Debug, Clone, Default)]
pub struct MatchStore {
    table: BTreeMap<CompactString, MatchedEntry>,
    index: HashMap<FileHash, CompactString>,
}

impl MatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `base_name`, creating it with a fresh hash if absent.
    pub fn entry_or_insert(&mut self, base_name: &str) -> &mut MatchedEntry {
        match self.table.entry(CompactString::new(base_name)) {
            btree_map::Entry::Occupied(slot) => slot.into_mut(),
            btree_map::Entry::Vacant(slot) => {
                let entry = MatchedEntry::new(base_name);
                Self::index_insert(&mut self.index, entry.hash, &entry.base_name);
                slot.insert(entry)
            }
        }
    }

    fn index_insert(index: &mut HashMap<FileHash, CompactString>, hash: FileHash, base: &str) {
        if let Some(existing) = index.get(&hash) {
            if existing.as_str() != base {
                warn!(
                    hash = %hash,
                    existing = %existing,
                    colliding = base,
                    "Hash collision, keeping the first base name"
                );
            }
            return;
        }
        index.insert(hash, CompactString::new(base));
    }

    #[must_use]
    pub fn get(&self, base_name: &str) -> Option<&MatchedEntry> {
        self.table.get(base_name)
    }

    #[must_use]
    pub fn base_name(&self, hash: FileHash) -> Option<&str> {
        self.index.get(&hash).map(CompactString::as_str)
    }

    /// Resolve a hash to its entry.
    pub fn resolve(&self, hash: FileHash) -> AppResult<&MatchedEntry> {
        self.base_name(hash)
            .and_then(|base| self.table.get(base))
            .ok_or_else(|| AppError::not_found("Hash", hash.to_string()))
    }

    pub fn resolve_mut(&mut self, hash: FileHash) -> AppResult<&mut MatchedEntry> {
        let base = self
            .index
            .get(&hash)
            .ok_or_else(|| AppError::not_found("Hash", hash.to_string()))?;

        self.table
            .get_mut(base)
            .ok_or_else(|| AppError::not_found("Base name", base.to_string()))
    }

    /// Move the entry behind `hash` to a new base name, keeping its hash.
    ///
    /// Fails with `Conflict` when `new_base` is already a key of the table.
    pub fn rekey(&mut self, hash: FileHash, new_base: &str) -> AppResult<&mut MatchedEntry> {
        let old_base = self
            .index
            .get(&hash)
            .cloned()
            .ok_or_else(|| AppError::not_found("Hash", hash.to_string()))?;

        if old_base.as_str() != new_base && self.table.contains_key(new_base) {
            return Err(AppError::conflict(
                new_base,
                "an entry with this base name already exists",
            ));
        }

        let mut entry = self
            .table
            .remove(&old_base)
            .ok_or_else(|| AppError::not_found("Base name", old_base.to_string()))?;

        entry.base_name = CompactString::new(new_base);
        self.index.insert(hash, entry.base_name.clone());

        Ok(self
            .table
            .entry(entry.base_name.clone())
            .or_insert(entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries in base-name order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchedEntry> {
        self.table.values()
    }

    /// Lockstep check between table and index, ignoring hash collisions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let index_ok = self
            .index
            .iter()
            .all(|(hash, base)| self.table.get(base).is_some_and(|e| e.hash == *hash));

        let table_ok = self.table.values().all(|entry| {
            self.index
                .get(&entry.hash)
                .is_some_and(|base| base == &entry.base_name || self.table.contains_key(base))
        });

        index_ok && table_ok
    }
}
