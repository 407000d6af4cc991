//! Unified test utilities for treemirror tests and benchmarks

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use treemirror_sync::{MemoryLog, SyncCycle};
use walkdir::WalkDir;

/// One entry of a [`TreeSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A directory
    Dir,
    /// A regular file and its bytes
    File(Vec<u8>),
    /// A symlink or special file
    Other,
}

/// Every entry below a root, keyed by relative path
pub type TreeSnapshot = BTreeMap<PathBuf, Node>;

/// Capture the full content of a tree without following links
pub fn snapshot<P: AsRef<Path>>(root: P) -> TreeSnapshot {
    let root = root.as_ref();
    let mut nodes = TreeSnapshot::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.expect("Failed to walk tree");
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("Entry outside root")
            .to_path_buf();
        let file_type = entry.file_type();
        let node = if file_type.is_dir() {
            Node::Dir
        } else if file_type.is_file() {
            Node::File(fs::read(entry.path()).expect("Failed to read file"))
        } else {
            Node::Other
        };
        nodes.insert(relative, node);
    }

    nodes
}

/// Snapshot of only what a replica is expected to hold
pub fn mirrored_snapshot<P: AsRef<Path>>(root: P) -> TreeSnapshot {
    let mut nodes = snapshot(root);
    nodes.retain(|_, node| *node != Node::Other);
    nodes
}

/// Deterministic content of `size` bytes; different seeds give different bytes
pub fn generate_test_data(size: usize, seed: u8) -> Vec<u8> {
    (0..size)
        .map(|i| ((i * 7 + 13) % 251) as u8 ^ seed)
        .collect()
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file<P: AsRef<Path>>(root: P, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.as_ref().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// A source tree, a replica location and a recording log inside one temp dir
pub struct MirrorFixture {
    /// Owns everything on disk
    pub temp_dir: TempDir,
    /// Source root (created)
    pub source: PathBuf,
    /// Replica root (not created)
    pub replica: PathBuf,
    /// Log every cycle writes to
    pub log: Arc<MemoryLog>,
}

impl MirrorFixture {
    /// Create an empty source root and an absent replica root
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir(&source).expect("Failed to create source");
        Self {
            temp_dir,
            source,
            replica,
            log: Arc::new(MemoryLog::new()),
        }
    }

    /// Write a file under the source root
    pub fn source_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        write_file(&self.source, relative, content)
    }

    /// Write a file under the replica root
    pub fn replica_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        write_file(&self.replica, relative, content)
    }

    /// Create a directory (and parents) under the source root
    pub fn source_dir(&self, relative: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    /// Cycle between the two roots, logging into [`Self::log`]
    pub fn cycle(&self) -> SyncCycle {
        SyncCycle::new(&self.source, &self.replica, self.log.clone())
    }

    /// Panic unless the replica holds exactly the mirrored part of the source
    pub fn assert_mirrored(&self) {
        assert_eq!(mirrored_snapshot(&self.source), snapshot(&self.replica));
    }
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}
