//! Core types for dirsnap.
//!
//! This crate provides the fundamental data structures shared by the
//! walker, differ, and report writer: entry records, directory
//! snapshots, walk configuration, and the error taxonomy.

mod config;
mod entry;
mod error;
mod snapshot;

pub use config::{WalkConfig, WalkConfigBuilder, DEFAULT_MAX_ENTRIES};
pub use entry::{EntryKind, EntryRecord, FileKey, WalkedEntry};
pub use error::{FailureKind, StatFailure, WalkError};
pub use snapshot::{DirSnapshot, EntryMeta, TreeSnapshot};
