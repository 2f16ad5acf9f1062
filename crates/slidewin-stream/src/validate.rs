//! Offline validator for result logs
//!
//! Re-derives every aggregate of a log from scratch: the window is rebuilt from the logged
//! values and timestamps with the same strict eviction rule, and the SUM or MEDIAN is
//! recomputed over the whole retained set (re-summation, full re-sort) instead of
//! incrementally. The first difference aborts validation with its line number.
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::{DateTime, TimeDelta, Utc};
use slidewin::Duration;

use crate::{
    error::{Error, Result},
    format::{parse_line, OutputLine},
    kind::AggregateKind,
};

/// Outcome of a successful validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// The validated aggregate
    pub kind: AggregateKind,
    /// Number of checked lines
    pub lines: usize,
}

/// Validates the log at `path`
pub fn check_file(path: impl AsRef<Path>, kind: AggregateKind, range: Duration) -> Result<ValidationReport> {
    let file = File::open(path.as_ref())?;
    check(BufReader::new(file), kind, range)
}

/// Validates a log read from `reader`
///
/// # Errors
///
/// Returns [Error::MalformedLine] for a line that cannot be parsed and [Error::Mismatch]
/// for the first line whose logged aggregate differs from the recomputed one.
pub fn check<R: BufRead>(reader: R, kind: AggregateKind, range: Duration) -> Result<ValidationReport> {
    let range = to_time_delta(range);
    let mut window: VecDeque<(DateTime<Utc>, i64)> = VecDeque::new();
    let mut lines = 0;

    for (i, text) in reader.lines().enumerate() {
        let line = i + 1;
        let parsed = parse_line(&text?, line)?;

        while window
            .front()
            .is_some_and(|(at, _)| parsed.at.signed_duration_since(*at) > range)
        {
            window.pop_front();
        }
        window.push_back((parsed.at, parsed.value));

        let values = window.iter().map(|(_, v)| *v);
        match kind {
            AggregateKind::Sum => check_sum(&parsed, line, values.fold(0, i64::wrapping_add))?,
            AggregateKind::Median => check_median(&parsed, line, median(values.collect()))?,
        }
        lines = line;
    }

    log::info!("All sliding window {kind} are correct.");
    Ok(ValidationReport { kind, lines })
}

fn check_sum(parsed: &OutputLine, line: usize, expected: i64) -> Result<()> {
    let actual = parsed.aggregate_i64().ok_or_else(|| Error::MalformedLine {
        line,
        reason: format!("expect sum to be an integer, but got {}", parsed.aggregate),
    })?;
    if expected != actual {
        return Err(Error::Mismatch {
            line,
            kind: "sum",
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

fn check_median(parsed: &OutputLine, line: usize, expected: f64) -> Result<()> {
    let actual = parsed.aggregate_f64().ok_or_else(|| Error::MalformedLine {
        line,
        reason: format!("expect median to be a number, but got {}", parsed.aggregate),
    })?;
    if expected != actual {
        return Err(Error::Mismatch {
            line,
            kind: "median",
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

fn median(mut values: Vec<i64>) -> f64 {
    values.sort_unstable();
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2] as f64
    } else {
        (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
    }
}

fn to_time_delta(range: Duration) -> TimeDelta {
    let nanos = range.whole_nanoseconds().clamp(0, i64::MAX as i128) as i64;
    TimeDelta::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidewin::{NumericalDuration, DEFAULT_WINDOW_RANGE};

    fn check_str(log: &str, kind: AggregateKind) -> Result<ValidationReport> {
        check(log.as_bytes(), kind, DEFAULT_WINDOW_RANGE)
    }

    const SUM_LOG: &str = "\
Received 10 at 2024-01-01T00:00:00Z, Sum 10.
Received 20 at 2024-01-01T00:00:01Z, Sum 30.
Received 30 at 2024-01-01T00:00:02Z, Sum 60.
Received 7 at 2024-01-01T00:00:06.5Z, Sum 37.
";

    const MEDIAN_LOG: &str = "\
Received 10 at 2024-01-01T00:00:00Z, Median 10.0.
Received 20 at 2024-01-01T00:00:01Z, Median 15.0.
Received 30 at 2024-01-01T00:00:02Z, Median 20.0.
Received 7 at 2024-01-01T00:00:06.5Z, Median 18.5.
";

    #[test]
    fn valid_sum_log_test() {
        let report = check_str(SUM_LOG, AggregateKind::Sum).unwrap();
        assert_eq!(report.lines, 4);
        assert_eq!(report.kind, AggregateKind::Sum);
    }

    #[test]
    fn valid_median_log_test() {
        assert_eq!(check_str(MEDIAN_LOG, AggregateKind::Median).unwrap().lines, 4);
    }

    #[test]
    fn empty_log_test() {
        assert_eq!(check_str("", AggregateKind::Sum).unwrap().lines, 0);
    }

    #[test]
    fn sum_mismatch_test() {
        let log = SUM_LOG.replace("Sum 60.", "Sum 61.");
        let err = check_str(&log, AggregateKind::Sum).unwrap_err();
        assert_eq!(
            err.to_string(),
            "at line 3, expected to have sum 60, but got 61"
        );
    }

    #[test]
    fn median_mismatch_test() {
        let log = MEDIAN_LOG.replace("Median 18.5.", "Median 20.0.");
        let err = check_str(&log, AggregateKind::Median).unwrap_err();
        assert!(err.is_mismatch());
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn strict_boundary_test() {
        // exactly 5s apart: both retained
        let log = "\
Received 1 at 2024-01-01T00:00:00Z, Sum 1.
Received 2 at 2024-01-01T00:00:05Z, Sum 3.
Received 4 at 2024-01-01T00:00:05.000000001Z, Sum 6.
";
        assert_eq!(check_str(log, AggregateKind::Sum).unwrap().lines, 3);
    }

    #[test]
    fn custom_range_test() {
        let err = check(SUM_LOG.as_bytes(), AggregateKind::Sum, 1.seconds()).unwrap_err();
        // a 1s window keeps the first value at line 2 and drops it at line 3
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.to_string(), "at line 3, expected to have sum 50, but got 60");
    }

    #[test]
    fn overflowing_sum_test() {
        let log = "\
Received 9223372036854775807 at 2024-01-01T00:00:00Z, Sum 9223372036854775807.
Received 1 at 2024-01-01T00:00:01Z, Sum -9223372036854775808.
";
        assert_eq!(check_str(log, AggregateKind::Sum).unwrap().lines, 2);

        let err = check_str(&log.replace("Sum -9223372036854775808.", "Sum 0."), AggregateKind::Sum)
            .unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.is_mismatch());
    }

    #[test]
    fn malformed_line_test() {
        let log = "Received 10 at 2024-01-01T00:00:00Z, Sum 10.\nReceived 10 at noon, Sum 20.\n";
        let err = check_str(log, AggregateKind::Sum).unwrap_err();
        assert!(err.is_malformed_line());
        assert_eq!(err.line(), Some(2));

        let log = "Received 10 at 2024-01-01T00:00:00Z, Sum 10.5.\n";
        let err = check_str(log, AggregateKind::Sum).unwrap_err();
        assert!(err.is_malformed_line());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn missing_file_test() {
        let err = check_file("/nonexistent/window_sum_result.txt", AggregateKind::Sum, DEFAULT_WINDOW_RANGE)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
