//! Directory and tree snapshot containers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::entry::WalkedEntry;

/// Snapshot of one directory level.
///
/// Entries are kept in traversal order (filesystem enumeration order,
/// not sorted). Entry names are unique within a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirSnapshot {
    /// Absolute path of the directory.
    pub path: PathBuf,

    /// Entries captured at this level, in enumeration order.
    pub entries: Vec<WalkedEntry>,

    /// True when the per-directory entry cap cut enumeration short.
    pub truncated: bool,
}

impl DirSnapshot {
    /// Create an empty snapshot for a directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            truncated: false,
        }
    }

    /// Number of slots at this level (entries, failures, and cycle markers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the level holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of inline capture failures at this level.
    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, WalkedEntry::Failed(_)))
            .count()
    }
}

/// Comparable metadata for one entry, keyed by relative path in a
/// [`TreeSnapshot`] index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Size in bytes.
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Full tree snapshot: depth-first preorder sequence of directory levels.
///
/// Serializes to JSON so a run can be saved and used as the baseline
/// for diffing on a later run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Root path the walk started from.
    pub root: PathBuf,

    /// When this snapshot was captured.
    pub captured_at: SystemTime,

    /// Directory levels in depth-first preorder.
    pub dirs: Vec<DirSnapshot>,
}

impl TreeSnapshot {
    /// Create a snapshot from walked levels.
    pub fn new(root: impl Into<PathBuf>, dirs: Vec<DirSnapshot>) -> Self {
        Self {
            root: root.into(),
            captured_at: SystemTime::now(),
            dirs,
        }
    }

    /// Total entries captured across all levels (excluding failures and
    /// cycle markers).
    pub fn entry_count(&self) -> usize {
        self.dirs
            .iter()
            .flat_map(|d| d.entries.iter())
            .filter(|e| e.record().is_some())
            .count()
    }

    /// Whether any level was truncated by the entry cap.
    pub fn any_truncated(&self) -> bool {
        self.dirs.iter().any(|d| d.truncated)
    }

    /// Find the level for an absolute directory path.
    pub fn find_dir(&self, path: &Path) -> Option<&DirSnapshot> {
        self.dirs.iter().find(|d| d.path == path)
    }

    /// Build an index from path-relative-to-root to comparable metadata.
    ///
    /// Failures and cycle markers are not indexed; diffing only
    /// considers successfully captured entries.
    pub fn index(&self) -> HashMap<PathBuf, EntryMeta> {
        let mut map = HashMap::new();
        for dir in &self.dirs {
            let rel_dir = dir.path.strip_prefix(&self.root).unwrap_or(&dir.path);
            for entry in &dir.entries {
                if let Some(record) = entry.record() {
                    map.insert(
                        rel_dir.join(record.name.as_str()),
                        EntryMeta {
                            size: record.size,
                            mode: record.mode,
                            modified: record.modified,
                        },
                    );
                }
            }
        }
        map
    }
}
