//! One-way periodic directory mirroring for treemirror
//!
//! This crate keeps a replica directory tree identical to a source tree:
//!
//! - **Structure mirroring**: every source directory exists in the replica
//! - **Content-aware copying**: files are copied when missing or when their
//!   SHA-256 digest differs
//! - **Pruning**: replica entries with no source counterpart are removed
//! - **Run loop**: cycles repeat on a fixed interval until shutdown is requested
//!
//! Each cycle is a full, stateless comparison of both trees. Every mutation is
//! written to an [`OperationLog`](treemirror_types::OperationLog).
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use treemirror_sync::{FileLog, SyncCycle};
//!
//! # fn example() -> treemirror_types::Result<()> {
//! let log = Arc::new(FileLog::open("sync.log")?);
//! let report = SyncCycle::new("source_dir", "replica_dir", log).run();
//! println!("{} files copied", report.stats.files_copied);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod compare;
pub mod copy;
pub mod cycle;
mod fsops;
pub mod mirror;
pub mod oplog;
pub mod prune;
pub mod runner;
pub mod scan;

pub use compare::{file_digest, files_equal, FileDigest};
pub use copy::reconcile_copies;
pub use cycle::{CycleReport, SyncCycle, COMPLETE_MESSAGE};
pub use mirror::mirror_directories;
pub use oplog::{FileLog, MemoryLog};
pub use prune::reconcile_prune;
pub use runner::{remaining_interval, validate_source, RunOutcome, RunState, Runner};
pub use scan::{count, scan, Scan, ScanEntry};
