//! Error types for walking and capture.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a walk (or the worker that owns it).
#[derive(Debug, Error)]
pub enum WalkError {
    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied opening the root.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl WalkError {
    /// Classify an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of per-entry capture failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Entry vanished between listing and stat.
    PathNotFound,
    /// Permission was denied.
    PermissionDenied,
    /// Expected a directory, found something else.
    NotADirectory,
    /// Any other I/O failure.
    Io,
}

impl FailureKind {
    /// Classify an I/O error kind.
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::NotADirectory => Self::NotADirectory,
            _ => Self::Io,
        }
    }

    /// Short label used in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PathNotFound => "path not found",
            Self::PermissionDenied => "permission denied",
            Self::NotADirectory => "not a directory",
            Self::Io => "i/o error",
        }
    }
}

/// Non-fatal capture failure recorded inline in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatFailure {
    /// Entry name the failure applies to.
    pub name: CompactString,
    /// Kind of failure.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

impl StatFailure {
    /// Record a failure from an I/O error.
    pub fn from_io(name: impl Into<CompactString>, err: &std::io::Error) -> Self {
        Self {
            name: name.into(),
            kind: FailureKind::from_io(err),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_error_classification() {
        let err = WalkError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, WalkError::PermissionDenied { .. }));

        let err = WalkError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, WalkError::NotFound { .. }));
    }

    #[test]
    fn test_stat_failure_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "vanished");
        let failure = StatFailure::from_io("ghost.txt", &io);
        assert_eq!(failure.kind, FailureKind::PathNotFound);
        assert_eq!(failure.name.as_str(), "ghost.txt");
        assert!(failure.message.contains("vanished"));
    }
}
