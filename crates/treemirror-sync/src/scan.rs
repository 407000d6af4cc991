//! Recursive tree enumeration

use std::fs;
use std::path::{Path, PathBuf};
use treemirror_types::{EntryKind, Error, Result};
use walkdir::WalkDir;

/// A single entry found below a scanned root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Absolute (root-joined) path of the entry
    pub path: PathBuf,
    /// Path relative to the scanned root
    pub relative: PathBuf,
    /// Kind of the entry, links not followed
    pub kind: EntryKind,
}

/// Lazy, pre-order enumeration of every entry below a root.
///
/// Parents are always yielded before their children and siblings come in file
/// name order. Symbolic links are reported as [`EntryKind::Other`] and never
/// followed. Per-entry failures are yielded as `Err` items; iteration carries on
/// with the next entry.
pub struct Scan {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl Scan {
    /// Do not descend into the directory yielded most recently
    pub fn skip_current_dir(&mut self) {
        self.inner.skip_current_dir();
    }
}

impl Iterator for Scan {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(error) => {
                let path = error.path().unwrap_or(&self.root).to_path_buf();
                let message = error
                    .io_error()
                    .map_or_else(|| error.to_string(), ToString::to_string);
                return Some(Err(Error::scan(path, message)));
            }
        };

        let relative = match entry.path().strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                return Some(Err(Error::scan(
                    entry.path(),
                    "entry is outside of the scanned root",
                )))
            }
        };

        Some(Ok(ScanEntry {
            kind: EntryKind::from_file_type(entry.file_type()),
            path: entry.into_path(),
            relative,
        }))
    }
}

impl std::fmt::Debug for Scan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scan").field("root", &self.root).finish()
    }
}

/// Enumerate every entry below `root`, excluding the root itself
pub fn scan<P: AsRef<Path>>(root: P) -> Scan {
    let root = root.as_ref().to_path_buf();
    let inner = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    Scan { root, inner }
}

/// Count the regular files and directories below `root`.
///
/// Fails only when the root itself cannot be listed; entries that vanish or
/// cannot be read during the walk are left out of the count.
pub fn count<P: AsRef<Path>>(root: P) -> Result<u64> {
    let root = root.as_ref();
    fs::read_dir(root).map_err(|e| Error::scan(root, e.to_string()))?;

    let total = scan(root)
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.kind.is_mirrored())
        .count();
    Ok(total as u64)
}
