//! slidewin maintains time-bounded sliding window aggregates over streams of timestamped integers
//!
//! Every received event is admitted into a window that retains entries at most
//! [DEFAULT_WINDOW_RANGE] (or a custom range) older than the latest event, and the
//! current aggregate (SUM or MEDIAN) is reported back for that event.
//!
//! ```
//! use slidewin::{NumericalDuration, SumWindow};
//!
//! let mut window = SumWindow::new(5.seconds());
//! assert_eq!(window.receive(10, 0), 10);
//! assert_eq!(window.receive(20, 1_000_000_000), 30);
//! // the first entry is more than 5 seconds old and gets evicted
//! assert_eq!(window.receive(7, 5_500_000_000), 27);
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(nonstandard_style, missing_docs)]
#![forbid(unsafe_code)]

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use core::{fmt, fmt::Debug};

/// Aggregation interface and the pre-defined SUM and MEDIAN aggregators
pub mod aggregator;
/// Arrival-ordered storage of window entries
pub mod store;
/// Sliding window binding a store, an aggregator and a window range
pub mod window;

pub use aggregator::{
    median::{IndexKind, MedianAggregator},
    sum::SumAggregator,
    Aggregator,
};
pub use store::WindowStore;
pub use time::{ext::NumericalDuration, Duration};
pub use window::{MedianWindow, SlidingWindow, SumWindow};

/// Default window range used by the stream consumers
pub const DEFAULT_WINDOW_RANGE: Duration = Duration::seconds(5);

/// Entry that can be admitted into a window
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entry<T: Debug> {
    /// Data to be aggregated
    pub data: T,
    /// Arrival timestamp in nanoseconds since unix epoch
    pub timestamp: u64,
}
impl<T: Debug> Entry<T> {
    /// Creates a new entry with given data and timestamp
    pub fn new(data: T, timestamp: u64) -> Self {
        Self { data, timestamp }
    }
}
impl<T: Debug> fmt::Display for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(data: {:?}, timestamp: {})", self.data, self.timestamp)
    }
}
impl<T: Debug> From<(T, u64)> for Entry<T> {
    fn from(val: (T, u64)) -> Self {
        Entry::new(val.0, val.1)
    }
}

/// Converts a window range into whole nanoseconds
///
/// Panics if the range is not positive. Ranges beyond `u64::MAX` nanoseconds saturate.
#[inline]
pub(crate) fn range_nanos(range: Duration) -> u64 {
    assert!(range.is_positive(), "Window range must be positive");
    range.whole_nanoseconds().min(u64::MAX as i128) as u64
}
