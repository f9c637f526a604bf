//! Anonymous usage logging: the run-summary record, the append-only log, and its summarizer.

pub mod log;
pub mod record;
pub mod summary;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use log::UsageLog;
pub use record::{PresetRef, RunSummary, EVENT_SIM_RUN};
pub use summary::{summarize_file, summarize_lines, UsageSummary};

pub const DEFAULT_USAGE_LOG_PATH: &str = "usage-log.jsonl";

#[derive(Debug, Error)]
pub enum UsageLogError {
    #[error("usage log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode usage record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("usage log lock poisoned")]
    Poisoned,
}
