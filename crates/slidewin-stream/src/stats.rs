use std::{fmt, time::Duration};

use hdrhistogram::Histogram;

/// Largest latency tracked exactly, longer updates are clamped to it
const MAX_TRACKED_NANOS: u64 = 60 * 1_000_000_000;

/// Per-event latency of window updates, in nanoseconds
#[derive(Debug, Clone)]
pub struct Latency {
    histogram: Histogram<u64>,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            histogram: Histogram::new_with_bounds(1, MAX_TRACKED_NANOS, 3)
                .expect("1ns..60s with 3 significant figures are valid bounds"),
        }
    }
}

impl Latency {
    /// Records one measurement
    #[inline]
    pub fn record(&mut self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(nanos);
    }

    /// Summarizes the recorded measurements
    pub fn summary(&self) -> LatencySummary {
        let h = &self.histogram;
        LatencySummary {
            count: h.len(),
            min: h.min(),
            p50: h.value_at_quantile(0.5),
            p99: h.value_at_quantile(0.99),
            max: h.max(),
        }
    }
}

/// Latency percentiles in nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    /// Number of measurements
    pub count: u64,
    /// Smallest measurement
    pub min: u64,
    /// Median measurement
    pub p50: u64,
    /// 99th percentile
    pub p99: u64,
    /// Largest measurement
    pub max: u64,
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} min={}ns p50={}ns p99={}ns max={}ns",
            self.count, self.min, self.p50, self.p99, self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_test() {
        let mut latency = Latency::default();
        assert_eq!(latency.summary().count, 0);
        for n in 1..=100u64 {
            latency.record(Duration::from_nanos(n * 100));
        }
        let summary = latency.summary();
        assert_eq!(summary.count, 100);
        assert_eq!(summary.min, 100);
        assert!(summary.p50 >= 4900 && summary.p50 <= 5100);
        assert!(summary.max >= 10_000);
        assert!(summary.to_string().starts_with("count=100 min=100ns"));
    }

    #[test]
    fn wide_range_test() {
        let mut latency = Latency::default();
        latency.record(Duration::from_nanos(250));
        latency.record(Duration::from_millis(3));
        latency.record(Duration::from_secs(120));

        let summary = latency.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 250);
        assert!(summary.p50 >= 2_997_000 && summary.p50 <= 3_003_000);
        // beyond the tracked range
        assert!(summary.max >= MAX_TRACKED_NANOS && summary.max < 2 * MAX_TRACKED_NANOS);
    }
}
