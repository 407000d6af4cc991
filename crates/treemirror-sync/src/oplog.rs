//! Operation log destinations
//!
//! Every create, copy and remove is recorded as one timestamped line:
//!
//! ```text
//! [2024-05-01 12:00:00] Copied file: /data/src/a.txt to /data/replica/a.txt
//! ```
//!
//! [`FileLog`] appends to a file and echoes to standard output; [`MemoryLog`]
//! keeps lines in memory.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use treemirror_types::{Error, OperationLog, Result};

/// Timestamp format used at the start of every line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a message as a timestamped log line
pub fn format_line(message: &str) -> String {
    format!("[{}] {}", Local::now().format(TIMESTAMP_FORMAT), message)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Append-only log file, optionally echoed to standard output
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    echo: bool,
}

impl FileLog {
    /// Open (or create) the log file for appending
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(format!("Unable to open log file '{}'", path.display()), &e))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            echo: true,
        })
    }

    /// Enable or disable echoing lines to standard output
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

impl OperationLog for FileLog {
    fn log(&self, message: &str) {
        let line = format_line(message);
        // One lock covers both destinations so lines keep the same order in each.
        let mut writer = lock(&self.writer);

        if let Err(e) = writeln!(writer, "{}", line).and_then(|()| writer.flush()) {
            eprintln!(
                "Error: Unable to write log file {}: {}",
                self.path.display(),
                e
            );
        }

        if self.echo {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
        }
    }

    fn flush(&self) {
        let _ = lock(&self.writer).flush();
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        OperationLog::flush(self);
    }
}

/// In-memory log, mostly useful in tests
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, without timestamps
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Number of messages starting with `prefix`
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        lock(&self.lines)
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        lock(&self.lines).iter().any(|line| line.contains(needle))
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        lock(&self.lines).clear();
    }
}

impl OperationLog for MemoryLog {
    fn log(&self, message: &str) {
        lock(&self.lines).push(message.to_string());
    }
}
