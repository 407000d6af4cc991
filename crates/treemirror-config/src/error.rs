//! Errors raised while loading and validating settings

use std::path::PathBuf;
use thiserror::Error;

/// Why a [`Config`](crate::Config) could not be produced
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file named on the command line does not exist
    #[error("Configuration file not found: '{}'", .path.display())]
    FileNotFound {
        /// Path that was given
        path: PathBuf,
    },

    /// A source could not be parsed or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required path was not supplied by any layer
    #[error("Missing required setting '{key}'")]
    Missing {
        /// Dotted key, e.g. `paths.source`
        key: &'static str,
    },

    /// Settings are present but unusable together
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// What is wrong
        message: String,
    },

    /// A relative path could not be made absolute
    #[error("Cannot resolve '{}': {source}", .path.display())]
    Resolve {
        /// Path being resolved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Settings that are individually fine but conflict
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for treemirror_types::Error {
    fn from(error: ConfigError) -> Self {
        Self::config(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
