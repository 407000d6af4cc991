//! Content-aware file copying

use crate::compare::files_equal;
use crate::fsops::{entry_kind, remove_entry};
use crate::scan::scan;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use treemirror_types::{CycleStats, EntryKind, Error, OperationLog, Result};

/// Make sure every regular file of `source` exists in `replica` with the same content.
///
/// Missing files are copied; files whose content differs are overwritten; files
/// with identical content are left alone. A directory or link occupying the
/// destination is removed first. A failure on one file is logged and the
/// reconciler moves on to the next one.
pub fn reconcile_copies(source: &Path, replica: &Path, log: &dyn OperationLog) -> CycleStats {
    let mut stats = CycleStats::new();

    for item in scan(source) {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                log.log_error(&error);
                stats.errors += 1;
                continue;
            }
        };
        if entry.kind != EntryKind::File {
            continue;
        }

        let target = replica.join(&entry.relative);
        if let Err(error) = sync_file(&entry.path, &target, log, &mut stats) {
            log.log_error(&error);
            stats.errors += 1;
        }
    }

    debug!(
        copied = stats.files_copied,
        unchanged = stats.files_unchanged,
        bytes = stats.bytes_copied,
        "File contents reconciled"
    );
    stats
}

fn sync_file(
    source: &Path,
    target: &Path,
    log: &dyn OperationLog,
    stats: &mut CycleStats,
) -> Result<()> {
    let existing = entry_kind(target)
        .map_err(|e| Error::io(format!("Failed to inspect '{}'", target.display()), &e))?;

    let needs_copy = match existing {
        None => true,
        Some(EntryKind::File) => match files_equal(source, target) {
            Ok(equal) => !equal,
            Err(error) => {
                warn!(
                    source = %source.display(),
                    target = %target.display(),
                    %error,
                    "Content comparison failed, copying"
                );
                true
            }
        },
        Some(kind) => {
            if remove_entry(target, kind)
                .map_err(|e| Error::io(format!("Failed to remove '{}'", target.display()), &e))?
            {
                log.log(&format!("Removed: {}", target.display()));
                stats.entries_removed += 1;
            }
            true
        }
    };

    if !needs_copy {
        stats.files_unchanged += 1;
        return Ok(());
    }

    let overwrite = existing == Some(EntryKind::File);
    let bytes = copy_into(source, target, overwrite).map_err(|e| {
        Error::io(
            format!(
                "Failed to copy '{}' to '{}'",
                source.display(),
                target.display()
            ),
            &e,
        )
    })?;
    log.log(&format!(
        "Copied file: {} to {}",
        source.display(),
        target.display()
    ));
    stats.files_copied += 1;
    stats.bytes_copied += bytes;
    Ok(())
}

/// Copy `source` onto `target`. A read-only file carried over from an earlier
/// copy refuses to be overwritten, so it is replaced instead.
fn copy_into(source: &Path, target: &Path, overwrite: bool) -> io::Result<u64> {
    match fs::copy(source, target) {
        Err(e) if overwrite && e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(target = %target.display(), "Replacing read-only replica file");
            fs::remove_file(target)?;
            fs::copy(source, target)
        }
        result => result,
    }
}
