//! Sequential depth-first directory walker.

use std::collections::VecDeque;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use compact_str::CompactString;
use tracing::{debug, warn};

use dirsnap_core::{
    DirSnapshot, EntryKind, EntryRecord, FileKey, StatFailure, TreeSnapshot, WalkConfig, WalkError,
    WalkedEntry,
};

use crate::visited::VisitedSet;

/// Lazy depth-first walker over a directory tree.
///
/// Yields one [`DirSnapshot`] per directory level in preorder, so a
/// caller can stream levels without buffering the whole tree. The walk
/// is sequential; there is no concurrency inside a single walk.
///
/// Per-entry stat failures and unopenable subdirectories are recorded
/// inline and do not abort the walk. Only a root that cannot be opened
/// fails construction.
#[derive(Debug)]
pub struct Walker {
    config: WalkConfig,
    root: PathBuf,
    visited: VisitedSet,
    pending: VecDeque<PathBuf>,
}

impl Walker {
    /// Open a walker for the configured root.
    ///
    /// Canonicalizes the root and verifies it is an openable directory;
    /// any failure here is fatal to the owning worker.
    pub fn new(config: WalkConfig) -> Result<Self, WalkError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|e| WalkError::io(&config.root, e))?;

        let metadata = std::fs::metadata(&root).map_err(|e| WalkError::io(&root, e))?;
        if !metadata.is_dir() {
            return Err(WalkError::NotADirectory { path: root });
        }

        // Fail fast on an unreadable root rather than mid-walk.
        std::fs::read_dir(&root).map_err(|e| WalkError::io(&root, e))?;

        let visited = VisitedSet::new();
        if let Some(key) = file_key(&metadata) {
            visited.track(key);
        }

        let mut pending = VecDeque::new();
        pending.push_front(root.clone());

        debug!(root = %root.display(), "starting walk");

        Ok(Self {
            config,
            root,
            visited,
            pending,
        })
    }

    /// Root path after canonicalization.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drain the walk into a full tree snapshot.
    pub fn collect_tree(self) -> TreeSnapshot {
        let root = self.root.clone();
        let dirs: Vec<DirSnapshot> = self.collect();
        TreeSnapshot::new(root, dirs)
    }

    /// Capture one directory level and schedule its subdirectories.
    fn capture_level(&mut self, dir: PathBuf) -> DirSnapshot {
        let mut snapshot = DirSnapshot::new(&dir);

        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(err) => {
                // Subdirectory became unopenable after listing; record
                // the failure at its own level and keep walking.
                warn!(path = %dir.display(), error = %err, "cannot open directory");
                let name = dir_name(&dir);
                snapshot
                    .entries
                    .push(WalkedEntry::Failed(StatFailure::from_io(name, &err)));
                return snapshot;
            }
        };

        // Subdirectories found at this level, in enumeration order.
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for dirent in read_dir {
            if snapshot.entries.len() >= self.config.max_entries {
                snapshot.truncated = true;
                debug!(
                    path = %dir.display(),
                    cap = self.config.max_entries,
                    "entry cap reached, truncating listing"
                );
                break;
            }

            let dirent = match dirent {
                Ok(d) => d,
                Err(err) => {
                    snapshot
                        .entries
                        .push(WalkedEntry::Failed(StatFailure::from_io("<unknown>", &err)));
                    continue;
                }
            };

            let name = CompactString::new(dirent.file_name().to_string_lossy());
            let entry_path = dir.join(dirent.file_name());

            // symlink_metadata never dereferences; a symlink is captured
            // as its own entry.
            let metadata = match std::fs::symlink_metadata(&entry_path) {
                Ok(m) => m,
                Err(err) => {
                    // Entry vanished between listing and stat, or stat
                    // was denied. Record and continue with siblings.
                    snapshot
                        .entries
                        .push(WalkedEntry::Failed(StatFailure::from_io(name, &err)));
                    continue;
                }
            };

            match self.capture_entry(&entry_path, name, &metadata) {
                Captured::Entry(record, recurse_into) => {
                    if let Some(subdir) = recurse_into {
                        subdirs.push(subdir);
                    }
                    snapshot.entries.push(WalkedEntry::Entry(record));
                }
                Captured::Cycle(name) => {
                    snapshot.entries.push(WalkedEntry::Cycle { name });
                }
            }
        }

        // Depth-first: first subdirectory's whole subtree before the next.
        for subdir in subdirs.into_iter().rev() {
            self.pending.push_front(subdir);
        }

        snapshot
    }

    /// Build the record for one entry and decide whether to recurse.
    fn capture_entry(
        &mut self,
        path: &Path,
        name: CompactString,
        metadata: &Metadata,
    ) -> Captured {
        let file_type = metadata.file_type();

        let (kind, recurse_into) = if file_type.is_dir() {
            match self.guard_cycle(path, metadata) {
                CycleCheck::Fresh => (EntryKind::Directory, Some(path.to_path_buf())),
                CycleCheck::AlreadyVisited => return Captured::Cycle(name),
                CycleCheck::Unknown => (EntryKind::Directory, Some(path.to_path_buf())),
            }
        } else if file_type.is_symlink() {
            let target = std::fs::read_link(path)
                .map(|p| CompactString::new(p.to_string_lossy()))
                .unwrap_or_default();

            let recurse = if self.config.follow_symlinks {
                match self.check_symlink_dir(path) {
                    SymlinkDir::Fresh => Some(path.to_path_buf()),
                    SymlinkDir::AlreadyVisited => return Captured::Cycle(name),
                    SymlinkDir::NotADirectory => None,
                }
            } else {
                None
            };
            (EntryKind::Symlink { target }, recurse)
        } else if file_type.is_file() {
            (EntryKind::File, None)
        } else {
            (EntryKind::Other, None)
        };

        Captured::Entry(
            EntryRecord {
                name,
                size: metadata.len(),
                mode: mode_bits(metadata),
                modified: metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
                kind,
                key: file_key(metadata),
            },
            recurse_into,
        )
    }

    /// Track a directory's inode; detects symlink/hardlink cycles.
    fn guard_cycle(&mut self, path: &Path, metadata: &Metadata) -> CycleCheck {
        match file_key(metadata) {
            Some(key) => {
                if self.visited.track(key) {
                    CycleCheck::Fresh
                } else {
                    warn!(path = %path.display(), "cycle detected, not recursing");
                    CycleCheck::AlreadyVisited
                }
            }
            None => CycleCheck::Unknown,
        }
    }

    /// Classify a symlink for recursion when following links.
    ///
    /// Uses the dereferenced metadata for the cycle guard so that a link
    /// back into an ancestor closes the cycle instead of recursing.
    fn check_symlink_dir(&mut self, path: &Path) -> SymlinkDir {
        match std::fs::metadata(path) {
            Ok(target_meta) if target_meta.is_dir() => match file_key(&target_meta) {
                Some(key) if self.visited.track(key) => SymlinkDir::Fresh,
                Some(_) => SymlinkDir::AlreadyVisited,
                None => SymlinkDir::NotADirectory,
            },
            _ => SymlinkDir::NotADirectory,
        }
    }
}

impl Iterator for Walker {
    type Item = DirSnapshot;

    fn next(&mut self) -> Option<DirSnapshot> {
        let dir = self.pending.pop_front()?;
        Some(self.capture_level(dir))
    }
}

/// Result of capturing one entry.
enum Captured {
    /// Record plus an optional subdirectory to schedule.
    Entry(EntryRecord, Option<PathBuf>),
    /// Directory already visited this walk.
    Cycle(CompactString),
}

enum CycleCheck {
    Fresh,
    AlreadyVisited,
    /// No (device, inode) available on this platform.
    Unknown,
}

/// What a symlink dereferences to, for follow-mode recursion.
enum SymlinkDir {
    /// Directory not yet visited this walk.
    Fresh,
    /// Directory already visited; the link closes a cycle.
    AlreadyVisited,
    /// Not a directory (or unreadable); never recursed.
    NotADirectory,
}

/// Last path segment, falling back to the full path for roots like `/`.
fn dir_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}

// Cross-platform metadata helpers

/// Permission bits from metadata.
#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    metadata.mode()
}

#[cfg(not(unix))]
fn mode_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// (device, inode) key from metadata.
#[cfg(unix)]
fn file_key(metadata: &Metadata) -> Option<FileKey> {
    Some(FileKey::new(metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_key(_metadata: &Metadata) -> Option<FileKey> {
    None // Windows has no stable inode equivalent here
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "0123456789").unwrap();
        fs::write(root.join("sub/b.txt"), "01234567890123456789").unwrap();

        temp
    }

    #[test]
    fn test_walk_levels_in_preorder() {
        let temp = create_test_tree();
        let walker = Walker::new(WalkConfig::new(temp.path())).unwrap();
        let levels: Vec<DirSnapshot> = walker.collect();

        assert_eq!(levels.len(), 2);
        assert!(levels[0].path.ends_with(temp.path().file_name().unwrap()));
        assert!(levels[1].path.ends_with("sub"));

        let names: Vec<&str> = levels[0].entries.iter().map(|e| e.name()).collect();
        assert!(names.contains(&"a.txt"));
        assert!(names.contains(&"sub"));
    }

    #[test]
    fn test_entry_sizes_captured() {
        let temp = create_test_tree();
        let tree = Walker::new(WalkConfig::new(temp.path()))
            .unwrap()
            .collect_tree();

        let index = tree.index();
        assert_eq!(index[&PathBuf::from("a.txt")].size, 10);
        assert_eq!(index[&PathBuf::from("sub/b.txt")].size, 20);
    }

    #[test]
    fn test_missing_root_is_typed_error() {
        let temp = TempDir::new().unwrap();
        let config = WalkConfig::new(temp.path().join("nope"));
        match Walker::new(config) {
            Err(WalkError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        match Walker::new(WalkConfig::new(&file)) {
            Err(WalkError::NotADirectory { .. }) => {}
            other => panic!("expected NotADirectory, got {other:?}"),
        }
    }

    #[test]
    fn test_entry_cap_truncates() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            fs::write(temp.path().join(format!("f{i}")), "x").unwrap();
        }

        let config = WalkConfig::builder()
            .root(temp.path())
            .max_entries(4usize)
            .build()
            .unwrap();
        let levels: Vec<DirSnapshot> = Walker::new(config).unwrap().collect();

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].len(), 4);
        assert!(levels[0].truncated);
    }

    #[test]
    fn test_small_listing_not_truncated() {
        let temp = create_test_tree();
        let levels: Vec<DirSnapshot> = Walker::new(WalkConfig::new(temp.path()))
            .unwrap()
            .collect();
        assert!(levels.iter().all(|l| !l.truncated));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_captured_without_following() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("sub"), temp.path().join("link")).unwrap();

        let tree = Walker::new(WalkConfig::new(temp.path()))
            .unwrap()
            .collect_tree();

        // Only root and sub levels; the link is a leaf entry.
        assert_eq!(tree.dirs.len(), 2);
        let link = tree.dirs[0]
            .entries
            .iter()
            .find(|e| e.name() == "link")
            .and_then(|e| e.record())
            .unwrap();
        assert!(link.kind.is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates_with_one_marker() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("inner")).unwrap();
        fs::write(root.join("inner/f.txt"), "data").unwrap();
        // Link back up to the walk root.
        std::os::unix::fs::symlink(root, root.join("inner/loop")).unwrap();

        let config = WalkConfig::builder()
            .root(root)
            .follow_symlinks(true)
            .build()
            .unwrap();
        let levels: Vec<DirSnapshot> = Walker::new(config).unwrap().collect();

        let cycles: usize = levels
            .iter()
            .flat_map(|l| l.entries.iter())
            .filter(|e| matches!(e, WalkedEntry::Cycle { .. }))
            .count();
        assert_eq!(cycles, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdir_recorded_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp = create_test_tree();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&locked).is_ok() {
            // Running privileged; permission bits don't apply.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let levels: Vec<DirSnapshot> = Walker::new(WalkConfig::new(temp.path()))
            .unwrap()
            .collect();

        // Restore so TempDir can clean up.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let locked_level = levels.iter().find(|l| l.path.ends_with("locked")).unwrap();
        assert_eq!(locked_level.failure_count(), 1);

        // Sibling subtree still walked.
        assert!(levels.iter().any(|l| l.path.ends_with("sub")));
    }
}
