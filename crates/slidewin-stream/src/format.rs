//! Output line format shared by the consumers and the offline validator
//!
//! Every received value produces one line:
//!
//! ```text
//! Received 10 at 2024-01-01T00:00:00.000000000Z, Sum 10.
//! Received 20 at 2024-01-01T00:00:01.000000000Z, Median 15.0.
//! ```
use chrono::{DateTime, SecondsFormat, Utc};
use slidewin::{Aggregator, MedianAggregator, SumAggregator};

use crate::error::{Error, Result};

/// Aggregators whose results can be written to an output line
pub trait Render: Aggregator<Input = i64> {
    /// Label written in front of the aggregate
    const LABEL: &'static str;

    /// Formats an aggregate
    fn render(aggregate: &Self::Aggregate) -> String;
}

impl Render for SumAggregator {
    const LABEL: &'static str = "Sum";

    fn render(aggregate: &i64) -> String {
        aggregate.to_string()
    }
}

impl Render for MedianAggregator {
    const LABEL: &'static str = "Median";

    fn render(aggregate: &f64) -> String {
        format!("{aggregate:.1}")
    }
}

/// Formats a timestamp as RFC3339 with nanosecond precision
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Formats the output line for one received value, without a trailing newline
pub fn render_line<A: Render>(value: i64, at: &DateTime<Utc>, aggregate: &A::Aggregate) -> String {
    format!(
        "Received {value} at {}, {} {}.",
        format_timestamp(at),
        A::LABEL,
        A::render(aggregate)
    )
}

/// A parsed output line
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    /// The received value
    pub value: i64,
    /// The timestamp used for the value
    pub at: DateTime<Utc>,
    /// The aggregate label (`Sum`, `Median`)
    pub label: String,
    /// The aggregate as written, e.g. `60` or `15.5`
    pub aggregate: String,
}

impl OutputLine {
    /// Parses the aggregate as an integer
    pub fn aggregate_i64(&self) -> Option<i64> {
        self.aggregate.parse().ok()
    }
    /// Parses the aggregate as a real number
    pub fn aggregate_f64(&self) -> Option<f64> {
        self.aggregate.parse().ok()
    }
}

/// Parses an output line
///
/// Accepts RFC3339 timestamps with any fractional precision and offset. `line` is the
/// 1-based line number reported in errors.
pub fn parse_line(text: &str, line: usize) -> Result<OutputLine> {
    let malformed = |reason: String| Error::MalformedLine { line, reason };

    let rest = text
        .trim_end()
        .strip_prefix("Received ")
        .and_then(|rest| rest.strip_suffix('.'))
        .ok_or_else(|| malformed(format!("expected a \"Received ... .\" line, but got {text:?}")))?;

    let (value, rest) = rest
        .split_once(" at ")
        .ok_or_else(|| malformed(format!("missing timestamp in {text:?}")))?;
    let (timestamp, rest) = rest
        .rsplit_once(", ")
        .ok_or_else(|| malformed(format!("missing aggregate in {text:?}")))?;
    let (label, aggregate) = rest
        .split_once(' ')
        .ok_or_else(|| malformed(format!("missing aggregate label in {text:?}")))?;

    let value = value
        .parse::<i64>()
        .map_err(|_| malformed(format!("expect number to be an integer, but got {value}")))?;
    let at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| malformed(format!("expect time to be an RFC3339 time, but got {timestamp}")))?
        .with_timezone(&Utc);
    if label.is_empty() || !label.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(malformed(format!("expect a word label, but got {label:?}")));
    }

    Ok(OutputLine {
        value,
        at,
        label: label.to_string(),
        aggregate: aggregate.to_string(),
    })
}
