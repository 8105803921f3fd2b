//! Visited-inode tracking for cycle detection.

use dashmap::DashSet;
use dirsnap_core::FileKey;

/// Tracks directory inodes seen during one walk.
///
/// A directory whose (device, inode) pair was already visited closes a
/// symlink or hardlink cycle; the walker records it as a cycle leaf
/// instead of recursing into it again.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashSet<FileKey>,
}

impl VisitedSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Track a key. Returns `true` if this is the first time seeing it.
    pub fn track(&self, key: FileKey) -> bool {
        self.seen.insert(key)
    }

    /// Check if a key has been seen (without tracking).
    pub fn has_seen(&self, key: &FileKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of unique keys tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if no keys have been tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_new_key() {
        let visited = VisitedSet::new();
        let key = FileKey::new(1, 12345);

        assert!(visited.track(key));
        assert!(!visited.track(key)); // Second time returns false
    }

    #[test]
    fn test_has_seen() {
        let visited = VisitedSet::new();
        let key = FileKey::new(1, 12345);

        assert!(!visited.has_seen(&key));
        visited.track(key);
        assert!(visited.has_seen(&key));
    }

    #[test]
    fn test_different_devices() {
        let visited = VisitedSet::new();
        let key1 = FileKey::new(1, 12345);
        let key2 = FileKey::new(2, 12345); // Same inode, different device

        assert!(visited.track(key1));
        assert!(visited.track(key2));
        assert_eq!(visited.len(), 2);
    }
}
