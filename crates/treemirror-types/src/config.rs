//! Configuration types for treemirror
//!
//! Type-safe configuration values with validation.

use std::time::Duration;

/// Interval between the starts of two sync cycles, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct SyncInterval(u64);

impl SyncInterval {
    /// Minimum interval (1 second)
    pub const MIN: u64 = 1;
    /// Default interval (60 seconds)
    pub const DEFAULT: u64 = 60;

    /// Create a new interval with validation
    pub fn new(seconds: u64) -> Result<Self, String> {
        if seconds < Self::MIN {
            Err(format!(
                "Sync interval {} is below minimum {} second",
                seconds,
                Self::MIN
            ))
        } else {
            Ok(Self(seconds))
        }
    }

    /// Get the interval in seconds
    pub fn get(self) -> u64 {
        self.0
    }

    /// Get the interval as a duration
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for SyncInterval {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u64> for SyncInterval {
    type Error = String;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<SyncInterval> for u64 {
    fn from(interval: SyncInterval) -> Self {
        interval.0
    }
}
