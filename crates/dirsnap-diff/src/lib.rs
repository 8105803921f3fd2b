//! Snapshot diffing for dirsnap.
//!
//! Compares two [`TreeSnapshot`] values of the same root taken at
//! different times and classifies every entry as added, removed,
//! modified, or unchanged, keyed by path relative to the walk root.

mod diff;

pub use diff::{diff_snapshots, DiffReport, EntryChange};

// Re-export core types for convenience
pub use dirsnap_core::{EntryMeta, TreeSnapshot};
