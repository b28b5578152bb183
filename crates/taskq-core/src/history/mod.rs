//! Completed-job history.
//!
//! `HistoryStore` owns the append-only JSON-lines log and its weekly backup;
//! `HistoryWriter` feeds it from a background task so finalization never
//! waits on disk I/O. History is best-effort: failures are logged and dropped.

mod item;
mod store;
mod writer;

pub use item::HistoryItem;
pub use store::HistoryStore;
pub use writer::HistoryWriter;

use std::path::PathBuf;

/// Errors from the history log.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize history item: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("history writer has shut down")]
    WriterClosed,
}

impl HistoryError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
