//! `src/model/captions.rs`
//!
//! In-memory caption text per (hash, side), and the rule for merging
//! service-generated text into it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{identity::FileHash, match_table::Side};

/// How generated captions are combined with the text already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionUpdateMethod {
    #[default]
    Replace,
    Append,
}

/// Separator inserted between existing and appended caption text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionSeparator {
    #[default]
    Space,
    Comma,
    Newline,
    None,
}

impl CaptionSeparator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Comma => ", ",
            Self::Newline => "\n",
            Self::None => "",
        }
    }
}

/// Merge `incoming` into `existing` according to `method`.
#[must_use]
pub fn merge_caption(
    existing: &str,
    incoming: &str,
    method: CaptionUpdateMethod,
    separator: CaptionSeparator,
) -> String {
    match method {
        CaptionUpdateMethod::Replace => incoming.to_owned(),
        CaptionUpdateMethod::Append if existing.trim().is_empty() => incoming.to_owned(),
        CaptionUpdateMethod::Append => {
            format!("{}{}{}", existing.trim_end(), separator.as_str(), incoming)
        }
    }
}

/// Dirty state of a side's caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionState {
    Absent,
    Clean,
    Dirty,
}

/// Caption text as last persisted, and as currently edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionBuffer {
    pub persisted: Option<String>,
    pub current: String,
}

impl CaptionBuffer {
    #[must_use]
    pub fn loaded(content: String) -> Self {
        Self {
            current: content.clone(),
            persisted: Some(content),
        }
    }

    /// An absent text file with empty text counts as clean.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        match &self.persisted {
            Some(persisted) => persisted != &self.current,
            None => !self.current.is_empty(),
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.current = text.into();
    }

    pub fn mark_saved(&mut self) {
        self.persisted = Some(self.current.clone());
    }
}

/// All caption buffers of a session.
#[derive(Debug, Clone, Default)]
pub struct CaptionBook {
    buffers: HashMap<(FileHash, Side), CaptionBuffer>,
}

impl CaptionBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    #[must_use]
    pub fn get(&self, hash: FileHash, side: Side) -> Option<&CaptionBuffer> {
        self.buffers.get(&(hash, side))
    }

    pub fn get_or_default(&mut self, hash: FileHash, side: Side) -> &mut CaptionBuffer {
        self.buffers.entry((hash, side)).or_default()
    }

    pub fn insert(&mut self, hash: FileHash, side: Side, buffer: CaptionBuffer) {
        self.buffers.insert((hash, side), buffer);
    }

    pub fn remove(&mut self, hash: FileHash, side: Side) -> Option<CaptionBuffer> {
        self.buffers.remove(&(hash, side))
    }

    /// Current text, or empty when no buffer exists.
    #[must_use]
    pub fn text(&self, hash: FileHash, side: Side) -> &str {
        self.get(hash, side).map_or("", |b| b.current.as_str())
    }

    #[must_use]
    pub fn state(&self, hash: FileHash, side: Side) -> CaptionState {
        match self.get(hash, side) {
            None => CaptionState::Absent,
            Some(buffer) if buffer.is_dirty() => CaptionState::Dirty,
            Some(_) => CaptionState::Clean,
        }
    }

    /// Keys of dirty buffers, sorted for deterministic save order.
    #[must_use]
    pub fn dirty_keys(&self) -> Vec<(FileHash, Side)> {
        let mut keys: Vec<_> = self
            .buffers
            .iter()
            .filter(|(_, b)| b.is_dirty())
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|(hash, side)| (*hash, *side == Side::Right));
        keys
    }
}
