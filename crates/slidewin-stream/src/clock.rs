use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Source of arrival timestamps for received events
pub trait Clock: Send + Sync {
    /// Returns the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }
    /// Sets the current time
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
    /// Moves the clock forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock() += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Converts a timestamp into nanoseconds since unix epoch
///
/// Fails for timestamps before 1970 or beyond the year 2262.
pub fn to_nanos(at: &DateTime<Utc>) -> Result<u64> {
    at.timestamp_nanos_opt()
        .and_then(|ns| u64::try_from(ns).ok())
        .ok_or_else(|| Error::TimestampOutOfRange {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        })
}
