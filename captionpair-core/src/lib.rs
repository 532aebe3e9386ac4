pub mod error;

pub mod config;

pub mod logging;

pub mod fs {
    pub mod dir_scanner;

    pub mod file_entry;
    pub use file_entry::FileEntry;
}

pub mod model {
    pub mod identity;
    pub use identity::FileHash;

    pub mod filter;
    pub use filter::{FilterPattern, passes_filter};

    pub mod match_table;
    pub use match_table::{FileKind, MatchStore, MatchedEntry, Side, SideFiles};

    pub mod reconciler;
    pub use reconciler::reconcile;

    pub mod captions;
    pub use captions::{CaptionBook, CaptionBuffer, CaptionSeparator, CaptionState, CaptionUpdateMethod};

    pub mod mutation;
}

pub mod operators {
    pub mod file_system_operator;
    pub use file_system_operator::{FileSystem, LocalFileSystem};

    pub mod caption_service;
    pub use caption_service::{CaptionServiceClient, JobStatus};
}

pub mod controller {
    pub mod actions;
    pub use actions::{Action, ActionOutcome};

    pub mod session;
    pub use session::Session;

    pub mod caption_job;
    pub use caption_job::CaptionJobState;
}

pub use config::{Config, DeletePolicy};
pub use error::{AppError, AppResult, ErrorKind};
pub use logging::LoggerBuilder;
