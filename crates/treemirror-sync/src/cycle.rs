//! A single synchronization cycle

use crate::copy::reconcile_copies;
use crate::mirror::mirror_directories;
use crate::prune::reconcile_prune;
use crate::scan::count;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use treemirror_types::{CycleStats, Error, OperationLog, Result};

/// Message logged when a cycle that changed something leaves both trees with
/// the same number of entries
pub const COMPLETE_MESSAGE: &str =
    "Synchronization complete. All files and directories are synchronized.";

/// Outcome of one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// What the cycle did
    pub stats: CycleStats,
    /// Whether the completion line was logged
    pub complete: bool,
}

impl CycleReport {
    /// Whether the cycle mutated the replica
    pub fn changed(&self) -> bool {
        self.stats.changed()
    }
}

/// One-way mirror from a source root onto a replica root
#[derive(Clone)]
pub struct SyncCycle {
    source: PathBuf,
    replica: PathBuf,
    log: Arc<dyn OperationLog>,
}

impl SyncCycle {
    /// Create a cycle runner for the given roots
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        source: P,
        replica: Q,
        log: Arc<dyn OperationLog>,
    ) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            replica: replica.as_ref().to_path_buf(),
            log,
        }
    }

    /// Source root
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Replica root
    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Log this cycle reports to
    pub fn log(&self) -> &Arc<dyn OperationLog> {
        &self.log
    }

    /// Run one full cycle: directories, then files, then stale entries, then
    /// the completion check.
    ///
    /// Never fails: every problem is logged and the cycle carries on as far as
    /// it can. If the replica root cannot be created, or either root cannot be
    /// listed, that is logged once and the cycle does nothing.
    pub fn run(&self) -> CycleReport {
        let started = Instant::now();
        let log = self.log.as_ref();
        let mut stats = CycleStats::new();

        match self.ensure_replica() {
            Ok(created) => stats.replica_created = created,
            Err(error) => return self.abandon(&error, stats, started),
        }
        if let Err(error) = self.check_roots() {
            return self.abandon(&error, stats, started);
        }

        stats.merge(&mirror_directories(&self.source, &self.replica, log));
        stats.merge(&reconcile_copies(&self.source, &self.replica, log));
        stats.merge(&reconcile_prune(&self.source, &self.replica, log));

        let complete = stats.changed() && self.check_completion();
        stats.duration = started.elapsed();

        info!(
            directories_created = stats.directories_created,
            files_copied = stats.files_copied,
            bytes_copied = stats.bytes_copied,
            files_unchanged = stats.files_unchanged,
            entries_removed = stats.entries_removed,
            entries_skipped = stats.entries_skipped,
            errors = stats.errors,
            duration = ?stats.duration,
            "Sync cycle finished"
        );

        CycleReport { stats, complete }
    }

    /// Create the replica root if it is missing; returns whether it was created
    fn ensure_replica(&self) -> Result<bool> {
        match fs::metadata(&self.replica) {
            Ok(metadata) if metadata.is_dir() => Ok(false),
            Ok(_) => Err(Error::other(format!(
                "Replica path is not a directory: {}",
                self.replica.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.replica).map_err(|e| {
                    Error::io(
                        format!(
                            "Failed to create replica directory '{}'",
                            self.replica.display()
                        ),
                        &e,
                    )
                })?;
                self.log.log(&format!(
                    "Created replica directory: {}",
                    self.replica.display()
                ));
                Ok(true)
            }
            Err(e) => Err(Error::io(
                format!("Failed to inspect '{}'", self.replica.display()),
                &e,
            )),
        }
    }

    /// Both roots must be listable before any phase walks them
    fn check_roots(&self) -> Result<()> {
        for root in [&self.source, &self.replica] {
            fs::read_dir(root).map_err(|e| Error::scan(root, e.to_string()))?;
        }
        Ok(())
    }

    fn abandon(&self, error: &Error, mut stats: CycleStats, started: Instant) -> CycleReport {
        self.log.log_error(error);
        stats.errors += 1;
        stats.duration = started.elapsed();
        CycleReport {
            stats,
            complete: false,
        }
    }

    /// Compare entry counts of both trees and log the completion line when they
    /// match. Equal counts say nothing about content; this only reports that the
    /// structure converged.
    fn check_completion(&self) -> bool {
        let counts = count(&self.source).and_then(|source| {
            count(&self.replica).map(|replica| (source, replica))
        });

        match counts {
            Ok((source, replica)) if source == replica => {
                self.log.log(COMPLETE_MESSAGE);
                true
            }
            Ok((source, replica)) => {
                debug!(source, replica, "Entry counts differ after cycle");
                false
            }
            Err(error) => {
                self.log.log_error(&error);
                false
            }
        }
    }
}

impl std::fmt::Debug for SyncCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCycle")
            .field("source", &self.source)
            .field("replica", &self.replica)
            .finish_non_exhaustive()
    }
}
