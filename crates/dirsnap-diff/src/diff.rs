//! Classification of entries between two snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use dirsnap_core::TreeSnapshot;

/// How one entry changed between the old and new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryChange {
    /// Present only in the new snapshot.
    Added,
    /// Present only in the old snapshot.
    Removed,
    /// Present in both with differing size, mode, or mtime.
    Modified,
    /// Present in both, metadata identical.
    Unchanged,
}

impl EntryChange {
    /// Label used in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Modified => "Modified",
            Self::Unchanged => "Unchanged",
        }
    }
}

/// Per-path change classification for one walked tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// Change per path relative to the walk root.
    pub changes: HashMap<PathBuf, EntryChange>,
}

impl DiffReport {
    /// Classification for a relative path, if it appears in either snapshot.
    pub fn classify(&self, rel_path: &Path) -> Option<EntryChange> {
        self.changes.get(rel_path).copied()
    }

    /// Paths present only in the old snapshot, i.e. removed since then.
    pub fn removed_paths(&self) -> impl Iterator<Item = &Path> {
        self.changes
            .iter()
            .filter(|(_, c)| **c == EntryChange::Removed)
            .map(|(p, _)| p.as_path())
    }

    /// Number of entries with the given classification.
    pub fn count(&self, change: EntryChange) -> usize {
        self.changes.values().filter(|c| **c == change).count()
    }

    /// Whether anything changed at all.
    pub fn has_changes(&self) -> bool {
        self.changes
            .values()
            .any(|c| *c != EntryChange::Unchanged)
    }
}

/// Diff two snapshots of the same root.
///
/// Takes the union of relative paths from both trees. A path present in
/// only one side is Added or Removed; a path present in both is
/// Modified when any of (size, mode, mtime) differ, otherwise
/// Unchanged. Inline stat failures and cycle markers carry no
/// comparable metadata and are skipped.
pub fn diff_snapshots(old: &TreeSnapshot, new: &TreeSnapshot) -> DiffReport {
    let old_index = old.index();
    let new_index = new.index();

    let mut changes = HashMap::with_capacity(old_index.len().max(new_index.len()));

    for (path, old_meta) in &old_index {
        match new_index.get(path) {
            None => {
                changes.insert(path.clone(), EntryChange::Removed);
            }
            Some(new_meta) if new_meta != old_meta => {
                changes.insert(path.clone(), EntryChange::Modified);
            }
            Some(_) => {
                changes.insert(path.clone(), EntryChange::Unchanged);
            }
        }
    }

    for path in new_index.keys() {
        if !old_index.contains_key(path) {
            changes.insert(path.clone(), EntryChange::Added);
        }
    }

    let report = DiffReport { changes };
    debug!(
        added = report.count(EntryChange::Added),
        removed = report.count(EntryChange::Removed),
        modified = report.count(EntryChange::Modified),
        "diffed snapshots"
    );
    report
}
