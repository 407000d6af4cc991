//! Core type system and error handling for treemirror
//!
//! This crate provides the foundational types shared by every treemirror crate:
//!
//! - **Error handling**: the [`Error`] enum and its operation-log rendering
//! - **Core types**: entry classification and per-cycle statistics
//! - **Traits**: the [`OperationLog`] seam the reconcilers report through
//! - **Configuration**: validated configuration values
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use treemirror_types::{CycleStats, Result};
//!
//! fn example_cycle() -> Result<CycleStats> {
//!     let mut stats = CycleStats::new();
//!     stats.files_copied = 2;
//!     stats.bytes_copied = 4096;
//!     Ok(stats)
//! }
//!
//! assert!(example_cycle().unwrap().changed());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::SyncInterval;
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
