use crate::Entry;
use core::fmt::Debug;

/// Incremental MEDIAN aggregation over an ordered index
pub mod median;
/// Incremental SUM aggregation
pub mod sum;

/// Aggregation interface that window aggregators implement
///
/// An aggregator observes every entry admitted to and evicted from a window and keeps
/// whatever incremental state it needs to answer [Aggregator::query] for the entries
/// currently retained. Evicted entries are always entries that were previously inserted.
///
/// slidewin provides the following pre-defined aggregators:
/// - [sum]
/// - [median]
///
/// # Example
///
/// Here is a simple example showing a COUNT aggregator.
/// ```
/// use slidewin::{Aggregator, Entry};
///
/// #[derive(Default, Debug, Clone)]
/// struct CountAggregator(usize);
///
/// impl Aggregator for CountAggregator {
///     type Input = i64;
///     type Aggregate = usize;
///
///     fn insert(&mut self, _entry: &Entry<i64>) {
///         self.0 += 1;
///     }
///     fn evict(&mut self, _entry: &Entry<i64>) {
///         self.0 -= 1;
///     }
///     fn query(&self) -> Option<usize> {
///         (self.0 > 0).then_some(self.0)
///     }
///     fn len(&self) -> usize {
///         self.0
///     }
/// }
/// ```
pub trait Aggregator: Default + Debug + Clone + 'static {
    /// Input type carried by window entries
    type Input: InputBounds;

    /// Final aggregate reported for a window
    type Aggregate: Debug + Send;

    /// Adds a newly admitted entry to the aggregate state
    fn insert(&mut self, entry: &Entry<Self::Input>);

    /// Removes an evicted entry from the aggregate state
    fn evict(&mut self, entry: &Entry<Self::Input>);

    /// Returns the aggregate over the current entries or `None` if there are none
    fn query(&self) -> Option<Self::Aggregate>;

    /// Returns the number of entries the aggregate currently covers
    fn len(&self) -> usize;

    /// Returns `true` if the aggregate covers no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounds for Aggregator Input
pub trait InputBounds: Debug + Clone + Copy + Send {}
impl<T> InputBounds for T where T: Debug + Clone + Copy + Send {}
