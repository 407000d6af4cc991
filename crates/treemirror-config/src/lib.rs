//! Configuration management system for treemirror
//!
//! Settings are layered the same way for every run:
//!
//! 1. Built-in defaults
//! 2. An optional configuration file (YAML, TOML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `TREEMIRROR__`
//! 4. Values given on the command line
//!
//! and then validated as a whole.
//!
//! # Examples
//!
//! ```rust
//! use treemirror_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .with_paths("/data/source", "/backup/replica", "/var/log/treemirror.log")
//!     .with_interval(30)
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! assert_eq!(config.sync.interval.get(), 30);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use treemirror_types::SyncInterval;

pub mod builder;
pub mod error;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};

/// Main configuration structure for treemirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Source, replica and log file locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Sync loop configuration
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem locations the run operates on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the tree to mirror from
    pub source: PathBuf,
    /// Root of the tree to mirror into
    pub replica: PathBuf,
    /// Operation log file, appended to
    pub log_file: PathBuf,
}

/// Sync loop configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between cycle starts
    #[serde(rename = "interval_secs")]
    pub interval: SyncInterval,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Echo operation log lines to standard output
    pub echo_stdout: bool,
    /// Diagnostic log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            echo_stdout: true,
            level: "warn".to_string(),
        }
    }
}
