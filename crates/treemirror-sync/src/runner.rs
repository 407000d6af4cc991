//! The periodic run loop
//!
//! ```text
//! Validating ──source ok──▶ Syncing ──▶ Sleeping ──interval elapsed──▶ Validating
//!     │
//!     └──source invalid / shutdown requested──▶ Stopped
//! ```
//!
//! Shutdown requests are only acted on between cycles. A request that arrives
//! while a cycle is running takes effect once that cycle has finished; one
//! that arrives during the sleep ends the sleep early.

use crate::cycle::{CycleReport, SyncCycle};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use treemirror_types::{Error, Result};

/// Message logged when the source vanishes between cycles
pub const SOURCE_LOST_MESSAGE: &str =
    "Source directory has been deleted or is inaccessible. Exiting...";

/// Message logged when the loop stops
pub const STOPPED_MESSAGE: &str = "Synchronization stopped.";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown was requested
    Cancelled,
    /// The configured number of cycles ran
    Completed,
    /// The source root was missing, not a directory, or inaccessible
    SourceInvalid,
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Cancelled | Self::Completed => 0,
            Self::SourceInvalid => 1,
        }
    }
}

/// Run loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Checking the source root before a cycle
    Validating,
    /// Running a cycle
    Syncing,
    /// Waiting out the rest of the interval
    Sleeping(Duration),
    /// Finished
    Stopped(RunOutcome),
}

/// Time left to wait after a cycle that took `elapsed`; zero if the cycle overran
pub fn remaining_interval(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Check that the source root exists and is a directory
pub fn validate_source<P: AsRef<Path>>(source: P) -> Result<()> {
    let source = source.as_ref();
    match fs::metadata(source) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::SourceNotDirectory {
            path: source.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::SourceMissing {
            path: source.to_path_buf(),
        }),
        Err(e) => Err(Error::io(
            format!("Failed to access source '{}'", source.display()),
            &e,
        )),
    }
}

/// Repeats a [`SyncCycle`] on a fixed interval until stopped
#[derive(Debug)]
pub struct Runner {
    cycle: SyncCycle,
    interval: Duration,
    shutdown: CancellationToken,
    max_cycles: Option<u64>,
}

impl Runner {
    /// Create a runner that repeats `cycle` every `interval` until `shutdown` is cancelled
    pub fn new(cycle: SyncCycle, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            cycle,
            interval,
            shutdown,
            max_cycles: None,
        }
    }

    /// Stop after `cycles` cycles have run
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Drive the loop to completion
    pub async fn run(self) -> RunOutcome {
        let log = self.cycle.log().clone();
        let mut state = RunState::Validating;
        let mut cycles: u64 = 0;

        loop {
            debug!(?state, cycles, "Run loop transition");
            state = match state {
                RunState::Validating => {
                    if self.shutdown.is_cancelled() {
                        RunState::Stopped(RunOutcome::Cancelled)
                    } else if let Err(error) = validate_source(self.cycle.source()) {
                        log.log_error(&error);
                        if cycles > 0 {
                            log.log(SOURCE_LOST_MESSAGE);
                        }
                        RunState::Stopped(RunOutcome::SourceInvalid)
                    } else {
                        if cycles == 0 {
                            self.log_banner();
                        }
                        RunState::Syncing
                    }
                }
                RunState::Syncing => {
                    let started = Instant::now();
                    if let Some(report) = self.run_cycle().await {
                        debug!(
                            changed = report.changed(),
                            complete = report.complete,
                            "Cycle report"
                        );
                    }
                    cycles += 1;

                    if self.max_cycles.is_some_and(|max| cycles >= max) {
                        RunState::Stopped(RunOutcome::Completed)
                    } else {
                        RunState::Sleeping(remaining_interval(self.interval, started.elapsed()))
                    }
                }
                RunState::Sleeping(wait) => {
                    if !wait.is_zero() {
                        tokio::select! {
                            () = tokio::time::sleep(wait) => {}
                            () = self.shutdown.cancelled() => {
                                info!("Shutdown requested");
                            }
                        }
                    }
                    RunState::Validating
                }
                RunState::Stopped(outcome) => {
                    log.log(STOPPED_MESSAGE);
                    log.flush();
                    info!(?outcome, cycles, "Run loop stopped");
                    return outcome;
                }
            };
        }
    }

    fn log_banner(&self) {
        let log = self.cycle.log();
        log.log("Starting folder synchronization.");
        log.log(&format!("Source path: {}", self.cycle.source().display()));
        log.log(&format!("Replica path: {}", self.cycle.replica().display()));
        log.log(&format!(
            "Synchronization interval: {} seconds",
            self.interval.as_secs()
        ));
    }

    /// Run one cycle on the blocking pool; a panicking cycle is logged and
    /// treated as a cycle that did nothing.
    async fn run_cycle(&self) -> Option<CycleReport> {
        let cycle = self.cycle.clone();
        match tokio::task::spawn_blocking(move || cycle.run()).await {
            Ok(report) => Some(report),
            Err(join_error) => {
                self.cycle
                    .log()
                    .log_error(&Error::other(format!("Sync cycle aborted: {}", join_error)));
                None
            }
        }
    }
}
