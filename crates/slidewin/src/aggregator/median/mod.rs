mod sorted;
mod split;

use crate::{aggregator::Aggregator, Entry};
use sorted::SortedIndex;
use split::SplitIndex;

/// Position of an entry within the value-ordered index
///
/// Keys order by value first; equal values order by timestamp, which for strictly
/// increasing timestamps is arrival order. The tie-break only affects placement and
/// never the reported median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    /// The entry value
    pub value: i64,
    /// The entry timestamp in nanoseconds
    pub timestamp: u64,
}

impl From<&Entry<i64>> for SortKey {
    fn from(entry: &Entry<i64>) -> Self {
        Self {
            value: entry.data,
            timestamp: entry.timestamp,
        }
    }
}

/// Strategy used to keep window values ordered
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// A sorted vector with binary-search positioning and shifting insertion and removal
    ///
    /// Cheap for small windows (a few hundred entries) since shifting is a memmove.
    Sorted,
    /// An ordered multiset split into lower and upper halves
    ///
    /// Logarithmic insertion and removal regardless of window size.
    #[default]
    Split,
}

#[derive(Debug, Clone)]
enum MedianIndex {
    Sorted(SortedIndex),
    Split(SplitIndex),
}

impl MedianIndex {
    fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Sorted => Self::Sorted(SortedIndex::default()),
            IndexKind::Split => Self::Split(SplitIndex::default()),
        }
    }
    #[inline]
    fn insert(&mut self, key: SortKey) {
        match self {
            Self::Sorted(index) => index.insert(key),
            Self::Split(index) => index.insert(key),
        }
    }
    #[inline]
    fn remove(&mut self, key: &SortKey) -> bool {
        match self {
            Self::Sorted(index) => index.remove(key),
            Self::Split(index) => index.remove(key),
        }
    }
    #[inline]
    fn median(&self) -> Option<f64> {
        match self {
            Self::Sorted(index) => index.median(),
            Self::Split(index) => index.median(),
        }
    }
    #[inline]
    fn len(&self) -> usize {
        match self {
            Self::Sorted(index) => index.len(),
            Self::Split(index) => index.len(),
        }
    }
}

/// Incremental MEDIAN over `i64` values
///
/// Maintains a value-ordered index over exactly the entries retained by the window. For an
/// odd number of entries the median is the middle value; for an even number it is the mean
/// of the two middle values, which may be a half such as `15.5`.
///
/// # Example
///
/// ```
/// use slidewin::{Aggregator, Entry, IndexKind, MedianAggregator};
///
/// let mut median = MedianAggregator::new(IndexKind::Sorted);
/// median.insert(&Entry::new(10, 0));
/// median.insert(&Entry::new(21, 1));
/// assert_eq!(median.query(), Some(15.5));
/// ```
#[derive(Debug, Clone)]
pub struct MedianAggregator {
    index: MedianIndex,
}

impl Default for MedianAggregator {
    fn default() -> Self {
        Self::new(IndexKind::default())
    }
}

impl MedianAggregator {
    /// Creates a median aggregator backed by the given index strategy
    pub fn new(kind: IndexKind) -> Self {
        Self {
            index: MedianIndex::new(kind),
        }
    }
    /// Returns the index strategy in use
    pub fn index_kind(&self) -> IndexKind {
        match self.index {
            MedianIndex::Sorted(_) => IndexKind::Sorted,
            MedianIndex::Split(_) => IndexKind::Split,
        }
    }
}

impl Aggregator for MedianAggregator {
    type Input = i64;
    type Aggregate = f64;

    #[inline]
    fn insert(&mut self, entry: &Entry<i64>) {
        self.index.insert(SortKey::from(entry));
    }

    #[inline]
    fn evict(&mut self, entry: &Entry<i64>) {
        let removed = self.index.remove(&SortKey::from(entry));
        debug_assert!(removed, "evicted entry {entry} missing from median index");
    }

    #[inline]
    fn query(&self) -> Option<f64> {
        self.index.median()
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Mean of the two middle values as a real number
#[inline]
pub(crate) fn midpoint(low: i64, high: i64) -> f64 {
    (low as f64 + high as f64) / 2.0
}
