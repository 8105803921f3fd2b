//! Tree walking engine for dirsnap.
//!
//! Walks a directory tree depth-first, one level at a time, capturing
//! per-entry metadata into [`DirSnapshot`] values. The walk is lazy:
//! [`Walker`] is an iterator over levels, so reports can be streamed
//! without holding the whole tree in memory.
//!
//! Key properties:
//!
//! - **Sequential recursion** inside one walk; parallelism lives one
//!   layer up, across independent walks.
//! - **Cycle guard** via a visited (device, inode) set, so symlink and
//!   hardlink loops terminate with a recorded cycle marker.
//! - **Bounded listings**: at most `max_entries` per directory, with
//!   truncation surfaced as data.
//! - **Non-fatal stat failures** recorded inline; only an unopenable
//!   root fails the walk.
//!
//! # Example
//!
//! ```rust,no_run
//! use dirsnap_walk::{WalkConfig, Walker};
//!
//! let walker = Walker::new(WalkConfig::new("/path/to/walk")).unwrap();
//! let tree = walker.collect_tree();
//! println!("captured {} entries", tree.entry_count());
//! ```

mod visited;
mod walker;

pub use visited::VisitedSet;
pub use walker::Walker;

// Re-export core types for convenience
pub use dirsnap_core::{
    DirSnapshot, EntryKind, EntryRecord, FailureKind, FileKey, StatFailure, TreeSnapshot,
    WalkConfig, WalkError, WalkedEntry,
};
