//! treemirror integration testing suite
//!
//! Shared fixtures for the end-to-end tests and benchmarks that drive whole
//! synchronization cycles against real directory trees.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Tree fixtures, content generators and tree snapshots used by the
/// integration tests and benchmarks.
pub mod test_utils;

pub use test_utils::{
    generate_test_data, mirrored_snapshot, snapshot, write_file, MirrorFixture, Node, TreeSnapshot,
};
