//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Session Commands
//!
//! Defines the `Action` enum, one variant per user-initiated operation on a
//! [`Session`](crate::controller::session::Session). Actions are executed one
//! at a time through `Session::dispatch`, so a mutation never starts before
//! the previous one has finished.

use compact_str::CompactString;

use crate::model::{identity::FileHash, match_table::Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-list both directories and rebuild the table.
    ReadDirectories { pattern: String },

    Rename {
        hash: FileHash,
        side: Side,
        new_base_name: CompactString,
    },

    /// Copy media and current caption text to the other side.
    CopyToOtherSide { hash: FileHash, side: Side },

    Delete { hash: FileHash, side: Side },

    EditCaption {
        hash: FileHash,
        side: Side,
        text: String,
    },

    SaveCaption { hash: FileHash, side: Side },

    SaveDirtyCaptions,

    CopyCaptionFrom { hash: FileHash, side: Side },

    PasteCaptionTo { hash: FileHash, side: Side },
}

impl Action {
    /// Short name used in log events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReadDirectories { .. } => "read_directories",
            Self::Rename { .. } => "rename",
            Self::CopyToOtherSide { .. } => "copy_to_other_side",
            Self::Delete { .. } => "delete",
            Self::EditCaption { .. } => "edit_caption",
            Self::SaveCaption { .. } => "save_caption",
            Self::SaveDirtyCaptions => "save_dirty_captions",
            Self::CopyCaptionFrom { .. } => "copy_caption_from",
            Self::PasteCaptionTo { .. } => "paste_caption_to",
        }
    }
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Table rebuilt with this many entries.
    Listed { entries: usize },

    /// `None` when the new name equals the old one.
    Renamed { new_base_name: Option<CompactString> },

    Copied { to: Side },

    Deleted,

    CaptionEdited,

    CaptionSaved,

    CaptionsSaved { count: usize },

    CaptionCopied,

    CaptionPasted,
}
