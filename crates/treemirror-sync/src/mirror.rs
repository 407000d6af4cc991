//! Directory structure propagation

use crate::fsops::{entry_kind, remove_entry};
use crate::scan::scan;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use treemirror_types::{CycleStats, EntryKind, Error, OperationLog, Result};

/// Make sure every directory of `source` exists in `replica`.
///
/// Directories are created one level at a time, parents first. A file or link
/// sitting where a directory belongs is removed before the directory is created.
/// Nothing else in the replica is touched. Source entries that are neither files
/// nor directories are skipped and counted in `entries_skipped`.
pub fn mirror_directories(source: &Path, replica: &Path, log: &dyn OperationLog) -> CycleStats {
    let mut stats = CycleStats::new();
    let mut entries = scan(source);

    while let Some(item) = entries.next() {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                log.log_error(&error);
                stats.errors += 1;
                continue;
            }
        };

        match entry.kind {
            EntryKind::Directory => {}
            EntryKind::File => continue,
            EntryKind::Other => {
                warn!(path = %entry.path.display(), "Skipping unsupported entry");
                stats.entries_skipped += 1;
                continue;
            }
        }

        let target = replica.join(&entry.relative);
        if let Err(error) = ensure_directory(&target, log, &mut stats) {
            log.log_error(&error);
            stats.errors += 1;
            // Nothing below a directory we could not create can be mirrored.
            entries.skip_current_dir();
        }
    }

    debug!(
        created = stats.directories_created,
        skipped = stats.entries_skipped,
        "Directory structure mirrored"
    );
    stats
}

fn ensure_directory(target: &Path, log: &dyn OperationLog, stats: &mut CycleStats) -> Result<()> {
    let existing = entry_kind(target)
        .map_err(|e| Error::io(format!("Failed to inspect '{}'", target.display()), &e))?;

    match existing {
        Some(EntryKind::Directory) => return Ok(()),
        Some(kind) => {
            if remove_entry(target, kind)
                .map_err(|e| Error::io(format!("Failed to remove '{}'", target.display()), &e))?
            {
                log.log(&format!("Removed: {}", target.display()));
                stats.entries_removed += 1;
            }
        }
        None => {}
    }

    fs::create_dir(target).map_err(|e| {
        Error::io(
            format!("Failed to create directory '{}'", target.display()),
            &e,
        )
    })?;
    log.log(&format!("Created directory: {}", target.display()));
    stats.directories_created += 1;
    Ok(())
}
