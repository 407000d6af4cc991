//! Result type alias for treemirror operations

use crate::Error;

/// Result type alias for treemirror operations
pub type Result<T> = std::result::Result<T, Error>;
