//! Core traits for treemirror operations

use crate::Error;

/// Destination for operation log messages.
///
/// Implementations must be safe to call from several threads at once and must
/// never interleave two messages.
pub trait OperationLog: Send + Sync {
    /// Record one message
    fn log(&self, message: &str);

    /// Record an error using its log rendering
    fn log_error(&self, error: &Error) {
        self.log(&error.log_line());
    }

    /// Flush buffered messages to their destination
    fn flush(&self) {}
}

impl<T: OperationLog + ?Sized> OperationLog for std::sync::Arc<T> {
    fn log(&self, message: &str) {
        (**self).log(message);
    }

    fn log_error(&self, error: &Error) {
        (**self).log_error(error);
    }

    fn flush(&self) {
        (**self).flush();
    }
}
