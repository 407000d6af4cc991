//! Core data types for treemirror
//!
//! Entry classification shared by the scanner and the reconcilers, plus the
//! per-cycle statistics every reconciler feeds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::FileType;
use std::time::Duration;

/// Kind of a filesystem entry, as seen without following links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link, socket, device or anything else that is not mirrored
    Other,
}

impl EntryKind {
    /// Classify a file type obtained from `symlink_metadata`
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Whether entries of this kind take part in mirroring
    pub fn is_mirrored(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Statistics for a single sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CycleStats {
    /// Whether the replica root itself had to be created
    pub replica_created: bool,
    /// Number of directories created in the replica
    pub directories_created: u64,
    /// Number of files copied into the replica
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of files whose content already matched
    pub files_unchanged: u64,
    /// Number of replica entries removed
    pub entries_removed: u64,
    /// Number of source entries skipped as unsupported
    pub entries_skipped: u64,
    /// Number of errors logged during the cycle
    pub errors: u64,
    /// Total duration of the cycle
    pub duration: Duration,
}

impl CycleStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cycle mutated the replica in any way
    pub fn changed(&self) -> bool {
        self.replica_created
            || self.directories_created > 0
            || self.files_copied > 0
            || self.entries_removed > 0
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &CycleStats) {
        self.replica_created |= other.replica_created;
        self.directories_created += other.directories_created;
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.files_unchanged += other.files_unchanged;
        self.entries_removed += other.entries_removed;
        self.entries_skipped += other.entries_skipped;
        self.errors += other.errors;
        self.duration += other.duration;
    }
}
