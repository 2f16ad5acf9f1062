use std::{
    path::{Path, PathBuf},
    time::Duration as StdDuration,
};

use slidewin::{Duration, IndexKind, DEFAULT_WINDOW_RANGE};

use crate::kind::AggregateKind;

/// Default folder the result files are written to
pub const DEFAULT_OUTPUT_FOLDER: &str = "output";

/// Configuration of the consumer side of the pipeline
///
/// # Example
///
/// ```
/// use slidewin::NumericalDuration;
/// use slidewin_stream::{AggregateKind, PipelineConf};
///
/// let conf = PipelineConf::default()
///     .with_output_folder("/tmp/results")
///     .with_window_range(10.seconds());
/// assert_eq!(
///     conf.output_path(AggregateKind::Sum),
///     std::path::Path::new("/tmp/results/window_sum_result.txt")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConf {
    /// Window range shared by both aggregates
    pub window_range: Duration,
    /// Folder for `<topic>_result.txt` files
    pub output_folder: PathBuf,
    /// Topic carrying values for the SUM stream
    pub sum_topic: String,
    /// Topic carrying values for the MEDIAN stream
    pub median_topic: String,
    /// Ordered index used by the MEDIAN stream
    pub median_index: IndexKind,
}

impl Default for PipelineConf {
    fn default() -> Self {
        Self {
            window_range: DEFAULT_WINDOW_RANGE,
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            sum_topic: AggregateKind::Sum.default_topic().to_string(),
            median_topic: AggregateKind::Median.default_topic().to_string(),
            median_index: IndexKind::default(),
        }
    }
}

impl PipelineConf {
    /// Configures the window range
    pub fn with_window_range(mut self, range: Duration) -> Self {
        self.window_range = range;
        self
    }
    /// Configures the output folder
    pub fn with_output_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.output_folder = folder.into();
        self
    }
    /// Configures the topic for a given aggregate kind
    pub fn with_topic(mut self, kind: AggregateKind, topic: impl Into<String>) -> Self {
        match kind {
            AggregateKind::Sum => self.sum_topic = topic.into(),
            AggregateKind::Median => self.median_topic = topic.into(),
        }
        self
    }
    /// Configures the MEDIAN index strategy
    pub fn with_median_index(mut self, kind: IndexKind) -> Self {
        self.median_index = kind;
        self
    }
    /// Returns the topic of a given aggregate kind
    pub fn topic(&self, kind: AggregateKind) -> &str {
        match kind {
            AggregateKind::Sum => &self.sum_topic,
            AggregateKind::Median => &self.median_topic,
        }
    }
    /// Returns the result file of a given aggregate kind
    pub fn output_path(&self, kind: AggregateKind) -> PathBuf {
        result_path(&self.output_folder, self.topic(kind))
    }
}

/// Returns `<folder>/<topic>_result.txt`
pub fn result_path(folder: &Path, topic: &str) -> PathBuf {
    folder.join(format!("{topic}_result.txt"))
}

/// Configuration of the synthetic publisher
#[derive(Debug, Clone)]
pub struct PublisherConf {
    /// Values published per second
    pub rate: u32,
    /// How long to publish before sending the end-of-stream sentinel
    pub send_duration: StdDuration,
    /// Values are drawn uniformly from `0..max_value`
    pub max_value: i64,
    /// Seed for the value generator, random if unset
    pub seed: Option<u64>,
    /// Topics every value is published to
    pub topics: Vec<String>,
}

impl Default for PublisherConf {
    fn default() -> Self {
        Self {
            rate: 20,
            send_duration: StdDuration::from_secs(60),
            // 20 events/s over 5s keeps at most ~100 values in a window, far from i64 overflow
            max_value: 10000,
            seed: None,
            topics: AggregateKind::ALL
                .iter()
                .map(|k| k.default_topic().to_string())
                .collect(),
        }
    }
}

impl PublisherConf {
    /// Configures the publish rate in values per second
    ///
    /// # Panics
    ///
    /// Panics if `rate` is zero.
    pub fn with_rate(mut self, rate: u32) -> Self {
        assert!(rate > 0, "publish rate must be positive");
        self.rate = rate;
        self
    }
    /// Configures the send duration
    pub fn with_send_duration(mut self, duration: StdDuration) -> Self {
        self.send_duration = duration;
        self
    }
    /// Configures the exclusive upper bound for values
    ///
    /// # Panics
    ///
    /// Panics if `max_value` is not positive.
    pub fn with_max_value(mut self, max_value: i64) -> Self {
        assert!(max_value > 0, "max value must be positive");
        self.max_value = max_value;
        self
    }
    /// Configures a fixed seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    /// Configures the topics values are published to
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }
    /// Returns the delay between two published values
    pub fn period(&self) -> StdDuration {
        StdDuration::from_secs(1) / self.rate
    }
}
