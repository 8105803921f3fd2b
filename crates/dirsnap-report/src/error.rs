//! Error types for report writing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the report sink and coordinator.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Output artifact could not be opened.
    #[error("Cannot open output file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A payload write to the output artifact failed.
    #[error("Failed writing report: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },

    /// The writer task went away before acknowledging a payload.
    #[error("Report sink closed unexpectedly")]
    SinkClosed,

    /// Snapshot serialization failed.
    #[error("Failed to serialize snapshot: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    /// Saved-snapshot file I/O failed.
    #[error("Cannot write snapshot file {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
