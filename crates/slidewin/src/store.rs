use crate::Entry;
use core::{fmt::Debug, iter::FusedIterator};

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(feature = "std")]
use std::collections::VecDeque;

/// An arrival-ordered container of window entries
///
/// Entries are admitted at the back and evicted from the front. The store assumes entries
/// arrive with non-decreasing timestamps: eviction only inspects the front entry and stops
/// at the first one that is still within range, so a backdated entry deeper in the queue
/// is retained until everything in front of it has been evicted.
///
/// The store is not synchronized; it is meant to be owned by a single consumer.
#[derive(Debug, Clone)]
pub struct WindowStore<T: Debug> {
    entries: VecDeque<Entry<T>>,
}

impl<T: Debug> Default for WindowStore<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T: Debug> WindowStore<T> {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends an entry to the back of the store
    ///
    /// Timestamp monotonicity is not validated.
    #[inline]
    pub fn admit(&mut self, entry: Entry<T>) {
        self.entries.push_back(entry);
    }
    /// Removes and returns the front entry
    #[inline]
    pub fn pop_front(&mut self) -> Option<Entry<T>> {
        self.entries.pop_front()
    }
    /// Returns a reference to the oldest entry
    #[inline]
    pub fn front(&self) -> Option<&Entry<T>> {
        self.entries.front()
    }
    /// Returns a reference to the newest entry
    #[inline]
    pub fn back(&self) -> Option<&Entry<T>> {
        self.entries.back()
    }
    /// Returns the number of retained entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Returns `true` if the store holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Iterates over the retained entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }
    /// Evicts entries strictly older than `range` nanoseconds relative to `now`
    ///
    /// Returns a draining iterator over the evicted entries in arrival order. An entry is
    /// evicted while `now - entry.timestamp > range`; entries stamped after `now` are never
    /// evicted. Dropping the iterator early still completes the eviction.
    ///
    /// # Example
    ///
    /// ```
    /// use slidewin::{Entry, WindowStore};
    ///
    /// let mut store = WindowStore::new();
    /// store.admit(Entry::new(1i64, 0));
    /// store.admit(Entry::new(2i64, 3));
    /// let evicted: Vec<_> = store.evict_older_than(6, 5).collect();
    /// assert_eq!(evicted, vec![Entry::new(1, 0)]);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn evict_older_than(&mut self, now: u64, range: u64) -> Evicted<'_, T> {
        Evicted {
            store: self,
            now,
            range,
        }
    }

    #[inline]
    fn is_stale(&self, now: u64, range: u64) -> bool {
        self.entries
            .front()
            .is_some_and(|front| now.saturating_sub(front.timestamp) > range)
    }
}

/// Draining iterator returned by [WindowStore::evict_older_than]
#[derive(Debug)]
pub struct Evicted<'a, T: Debug> {
    store: &'a mut WindowStore<T>,
    now: u64,
    range: u64,
}

impl<T: Debug> Iterator for Evicted<'_, T> {
    type Item = Entry<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.store.is_stale(self.now, self.range) {
            self.store.pop_front()
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.store.len()))
    }
}

impl<T: Debug> FusedIterator for Evicted<'_, T> {}

impl<T: Debug> Drop for Evicted<'_, T> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    const SEC: u64 = 1_000_000_000;

    fn store_of(entries: &[(i64, u64)]) -> WindowStore<i64> {
        let mut store = WindowStore::new();
        for &e in entries {
            store.admit(e.into());
        }
        store
    }

    #[test]
    fn admit_and_pop_test() {
        let mut store = store_of(&[(1, 0), (2, SEC)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.front(), Some(&Entry::new(1, 0)));
        assert_eq!(store.back(), Some(&Entry::new(2, SEC)));
        assert_eq!(store.pop_front(), Some(Entry::new(1, 0)));
        assert_eq!(store.pop_front(), Some(Entry::new(2, SEC)));
        assert!(store.pop_front().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn evict_in_arrival_order_test() {
        let mut store = store_of(&[(1, 0), (2, SEC), (3, 2 * SEC), (4, 8 * SEC)]);
        let evicted: Vec<i64> = store
            .evict_older_than(8 * SEC, 5 * SEC)
            .map(|e| e.data)
            .collect();
        assert_eq!(evicted, vec![1, 2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evict_boundary_test() {
        // one nanosecond past the range is evicted
        let mut store = store_of(&[(1, 0)]);
        assert_eq!(store.evict_older_than(5 * SEC + 1, 5 * SEC).count(), 1);

        // 4.999s old is retained
        let mut store = store_of(&[(1, 0)]);
        assert_eq!(store.evict_older_than(5 * SEC - 1_000_000, 5 * SEC).count(), 0);

        // an age equal to the range is not strictly older
        let mut store = store_of(&[(1, 0)]);
        assert_eq!(store.evict_older_than(5 * SEC, 5 * SEC).count(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn evict_is_idempotent_test() {
        let mut store = store_of(&[(1, SEC), (2, 2 * SEC)]);
        assert_eq!(store.evict_older_than(3 * SEC, 5 * SEC).count(), 0);
        assert_eq!(store.evict_older_than(3 * SEC, 5 * SEC).count(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn evict_stops_at_first_fresh_entry_test() {
        // a backdated entry behind a fresh one is not inspected
        let mut store = store_of(&[(1, 10 * SEC), (2, 0)]);
        assert_eq!(store.evict_older_than(12 * SEC, 5 * SEC).count(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn future_entry_is_kept_test() {
        let mut store = store_of(&[(1, 10 * SEC)]);
        assert_eq!(store.evict_older_than(0, 5 * SEC).count(), 0);
    }

    #[test]
    fn dropped_iterator_finishes_eviction_test() {
        let mut store = store_of(&[(1, 0), (2, 0), (3, 0), (4, 10 * SEC)]);
        {
            let mut evicted = store.evict_older_than(10 * SEC, 5 * SEC);
            assert_eq!(evicted.next().map(|e| e.data), Some(1));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.front().map(|e| e.data), Some(4));
    }
}
