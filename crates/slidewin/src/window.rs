use crate::{
    aggregator::{median::MedianAggregator, sum::SumAggregator, Aggregator},
    range_nanos,
    store::WindowStore,
    Duration,
    Entry,
};

/// A sliding window over the SUM of its values
pub type SumWindow = SlidingWindow<SumAggregator>;
/// A sliding window over the MEDIAN of its values
pub type MedianWindow = SlidingWindow<MedianAggregator>;

/// A time-bounded sliding window that reports an aggregate for every received event
///
/// # How it works
///
/// Each call to [SlidingWindow::receive] first evicts entries from the front of the
/// [WindowStore] that are strictly older than the window range relative to the new event,
/// handing every evicted entry to the aggregator. The new entry is then admitted and the
/// aggregate over the retained entries is returned.
///
/// Events must be received with non-decreasing timestamps. Eviction inspects the front of
/// the store only, so a backdated event is neither rejected nor reordered; it simply stays
/// in the window until every entry in front of it has aged out.
///
/// ## Example
///
/// ```
/// use slidewin::{MedianWindow, NumericalDuration};
///
/// const SEC: u64 = 1_000_000_000;
/// let mut window = MedianWindow::new(5.seconds());
/// assert_eq!(window.receive(10, 0), 10.0);
/// assert_eq!(window.receive(20, SEC), 15.0);
/// assert_eq!(window.receive(30, 2 * SEC), 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow<A: Aggregator> {
    store: WindowStore<A::Input>,
    aggregator: A,
    range: Duration,
    range_ns: u64,
}

impl<A: Aggregator> SlidingWindow<A> {
    /// Creates a window with the given range and a default aggregator
    ///
    /// # Panics
    ///
    /// Panics if `range` is zero or negative.
    pub fn new(range: Duration) -> Self {
        Self::with_aggregator(range, A::default())
    }

    /// Creates a window with the given range and aggregator
    ///
    /// # Panics
    ///
    /// Panics if `range` is zero or negative or if the aggregator already covers entries.
    pub fn with_aggregator(range: Duration, aggregator: A) -> Self {
        assert!(
            aggregator.is_empty(),
            "Window aggregator must start without entries"
        );
        Self {
            store: WindowStore::new(),
            aggregator,
            range,
            range_ns: range_nanos(range),
        }
    }

    /// Returns the window range
    #[inline]
    pub fn range(&self) -> Duration {
        self.range
    }

    /// Returns the number of retained entries
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the window holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the underlying store
    pub fn store(&self) -> &WindowStore<A::Input> {
        &self.store
    }

    /// Returns a reference to the aggregator
    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    /// Evicts every entry strictly older than the range relative to `now`
    ///
    /// Returns the number of evicted entries. Calling this again with the same `now` is a
    /// no-op.
    pub fn evict(&mut self, now: u64) -> usize {
        let mut evicted = 0;
        for entry in self.store.evict_older_than(now, self.range_ns) {
            self.aggregator.evict(&entry);
            evicted += 1;
        }
        evicted
    }

    /// Receives a value observed at `now` and returns the aggregate over the window
    ///
    /// `now` is given in nanoseconds since unix epoch and is used both as the eviction
    /// reference and as the timestamp of the admitted entry.
    pub fn receive(&mut self, data: A::Input, now: u64) -> A::Aggregate {
        self.evict(now);

        let entry = Entry::new(data, now);
        self.aggregator.insert(&entry);
        self.store.admit(entry);

        match self.aggregator.query() {
            Some(aggregate) => aggregate,
            None => unreachable!("window holds the entry just admitted"),
        }
    }

    /// Returns the aggregate over the retained entries without evicting
    pub fn query(&self) -> Option<A::Aggregate> {
        self.aggregator.query()
    }
}
