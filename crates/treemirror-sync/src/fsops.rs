//! Filesystem helpers shared by the reconcilers

use std::fs;
use std::io;
use std::path::Path;
use treemirror_types::EntryKind;

/// Kind of whatever occupies `path`, without following links.
///
/// Returns `Ok(None)` when nothing is there.
pub(crate) fn entry_kind(path: &Path) -> io::Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(Some(EntryKind::from_file_type(metadata.file_type()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove an entry of the given kind, recursively for directories.
///
/// Returns `Ok(false)` when the entry was already gone.
pub(crate) fn remove_entry(path: &Path, kind: EntryKind) -> io::Result<bool> {
    let removed = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File => fs::remove_file(path),
        EntryKind::Other => remove_link(path),
    };

    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove a link or special entry itself, never what it points to
#[cfg(windows)]
fn remove_link(path: &Path) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    // Directory symlinks are directory entries on Windows.
    if fs::symlink_metadata(path)?.file_type().is_symlink_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
fn remove_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}
