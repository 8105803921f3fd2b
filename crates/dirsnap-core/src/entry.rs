//! Entry records captured during a walk.

use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::StatFailure;

/// (device, inode) pair identifying a filesystem object.
///
/// Used by the walker's cycle guard: a directory whose key was already
/// visited in the current walk is not recursed into again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileKey {
    /// Device ID.
    pub device: u64,
    /// Inode number.
    pub inode: u64,
}

impl FileKey {
    /// Create a new file key.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

/// Type of a captured entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link, captured without dereferencing.
    Symlink {
        /// Link target path.
        target: CompactString,
    },
    /// Other file types (sockets, devices, etc.).
    Other,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::Symlink { .. })
    }
}

/// Metadata captured for a single directory entry.
///
/// Immutable once captured; owned by the walk that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Entry name (path segment, not full path).
    pub name: CompactString,

    /// Size in bytes.
    pub size: u64,

    /// Permission bits (full st_mode on Unix).
    pub mode: u32,

    /// Last modification time.
    pub modified: SystemTime,

    /// Entry type.
    pub kind: EntryKind,

    /// (device, inode) key when available.
    pub key: Option<FileKey>,
}

impl EntryRecord {
    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Permission bits as an octal string, low nine bits plus setuid/setgid/sticky.
    pub fn mode_octal(&self) -> String {
        format!("{:o}", self.mode & 0o7777)
    }
}

/// One slot in a directory listing: a captured entry, an inline
/// capture failure, or a cycle marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalkedEntry {
    /// Successfully captured entry.
    Entry(EntryRecord),
    /// Stat failed for this name; the walk continued with siblings.
    Failed(StatFailure),
    /// Directory already visited in this walk; not recursed into.
    Cycle {
        /// Entry name at which the cycle closed.
        name: CompactString,
    },
}

impl WalkedEntry {
    /// Entry name regardless of variant.
    pub fn name(&self) -> &str {
        match self {
            WalkedEntry::Entry(record) => record.name.as_str(),
            WalkedEntry::Failed(failure) => failure.name.as_str(),
            WalkedEntry::Cycle { name } => name.as_str(),
        }
    }

    /// The captured record, if this slot holds one.
    pub fn record(&self) -> Option<&EntryRecord> {
        match self {
            WalkedEntry::Entry(record) => Some(record),
            _ => None,
        }
    }
}
