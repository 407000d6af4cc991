//! Removal of replica entries with no source counterpart

use crate::fsops::{entry_kind, remove_entry};
use crate::scan::scan;
use std::path::{Path, PathBuf};
use tracing::debug;
use treemirror_types::{CycleStats, EntryKind, Error, OperationLog};

/// Remove every replica entry that has no mirrored counterpart in `source`.
///
/// Stale entries are collected during the walk and removed afterwards.
/// Directories go with their whole subtree, so the walk does not descend into
/// one once it is scheduled. A counterpart that is a link or special file does
/// not justify keeping the replica entry. When the counterpart cannot be
/// inspected the replica entry is kept.
pub fn reconcile_prune(source: &Path, replica: &Path, log: &dyn OperationLog) -> CycleStats {
    let mut stats = CycleStats::new();
    let mut stale: Vec<(PathBuf, EntryKind)> = Vec::new();
    let mut entries = scan(replica);

    while let Some(item) = entries.next() {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) => {
                log.log_error(&error);
                stats.errors += 1;
                continue;
            }
        };

        let counterpart = source.join(&entry.relative);
        match entry_kind(&counterpart) {
            Ok(Some(kind)) if kind.is_mirrored() => {}
            Ok(_) => {
                if entry.kind == EntryKind::Directory {
                    entries.skip_current_dir();
                }
                stale.push((entry.path, entry.kind));
            }
            Err(e) => {
                log.log_error(&Error::io(
                    format!("Failed to inspect '{}'", counterpart.display()),
                    &e,
                ));
                stats.errors += 1;
                // Children would fail the same way.
                if entry.kind == EntryKind::Directory {
                    entries.skip_current_dir();
                }
            }
        }
    }

    for (path, kind) in stale {
        match remove_entry(&path, kind) {
            Ok(true) => {
                log.log(&format!("Removed: {}", path.display()));
                stats.entries_removed += 1;
            }
            Ok(false) => debug!(path = %path.display(), "Already gone"),
            Err(e) => {
                log.log_error(&Error::io(
                    format!("Failed to remove '{}'", path.display()),
                    &e,
                ));
                stats.errors += 1;
            }
        }
    }

    debug!(removed = stats.entries_removed, "Stale entries pruned");
    stats
}
