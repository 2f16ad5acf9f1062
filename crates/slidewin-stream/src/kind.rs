use std::{fmt, str::FromStr};

/// The aggregate computed by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AggregateKind {
    /// Sliding window SUM
    Sum,
    /// Sliding window MEDIAN
    Median,
}

impl AggregateKind {
    /// Both kinds in pipeline order
    pub const ALL: [AggregateKind; 2] = [AggregateKind::Sum, AggregateKind::Median];

    /// Lowercase name used in topics and validator messages
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Sum => "sum",
            AggregateKind::Median => "median",
        }
    }

    /// Default topic the kind is published on
    pub fn default_topic(&self) -> &'static str {
        match self {
            AggregateKind::Sum => "window_sum",
            AggregateKind::Median => "window_median",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(AggregateKind::Sum),
            "median" => Ok(AggregateKind::Median),
            other => Err(format!("task can only be 'sum' or 'median', got {other:?}")),
        }
    }
}
