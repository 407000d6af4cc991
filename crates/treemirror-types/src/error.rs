//! Error types and handling for treemirror
//!
//! Every failure in a sync cycle ends up as a single line in the operation log.
//! The [`Error::log_line`] helper renders an error with the prefix that line
//! carries: `Filesystem error:` for I/O failures and `Error:` for everything else.

use std::path::{Path, PathBuf};

/// Main error type for treemirror operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("{message}")]
    Io {
        /// Error message from the I/O operation, including the path involved
        message: String,
    },

    /// Directory enumeration failed
    #[error("Failed to read '{}': {message}", .path.display())]
    Scan {
        /// Path that could not be enumerated
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// The source root is gone
    #[error("Source path does not exist.")]
    SourceMissing {
        /// Source root that was checked
        path: PathBuf,
    },

    /// The source root exists but is not a directory
    #[error("Source path is not a directory.")]
    SourceNotDirectory {
        /// Source root that was checked
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors, including enumeration failures
    Io,
    /// Source root missing or not a directory
    InvalidSource,
    /// Configuration errors
    Config,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Scan { .. } => ErrorKind::Io,
            Self::SourceMissing { .. } | Self::SourceNotDirectory { .. } => {
                ErrorKind::InvalidSource
            }
            Self::Config { .. } => ErrorKind::Config,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Whether this is a filesystem failure
    pub fn is_io(&self) -> bool {
        self.kind() == ErrorKind::Io
    }

    /// Render the error as an operation log message
    pub fn log_line(&self) -> String {
        if self.is_io() {
            format!("Filesystem error: {}", self)
        } else {
            format!("Error: {}", self)
        }
    }

    /// Wrap an I/O error with a description of what was being attempted
    pub fn io<S: AsRef<str>>(context: S, error: &std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context.as_ref(), error),
        }
    }

    /// Create a new enumeration error
    pub fn scan<P: AsRef<Path>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Scan {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
