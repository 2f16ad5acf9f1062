use crate::{aggregator::Aggregator, Entry};

/// Incremental SUM over `i64` values
///
/// Keeps a running total that is adjusted on every insert and eviction, so the reported
/// sum always equals the exact sum of the retained values. The total uses two's complement
/// wrapping arithmetic: a sum outside the `i64` range wraps around instead of panicking, and
/// evicting the values that caused it restores the exact total.
#[derive(Default, Debug, Clone, Copy)]
pub struct SumAggregator {
    total: i64,
    count: usize,
}

impl SumAggregator {
    /// Returns the running total
    #[inline]
    pub fn total(&self) -> i64 {
        self.total
    }
}

impl Aggregator for SumAggregator {
    type Input = i64;
    type Aggregate = i64;

    #[inline]
    fn insert(&mut self, entry: &Entry<i64>) {
        self.total = self.total.wrapping_add(entry.data);
        self.count += 1;
    }

    #[inline]
    fn evict(&mut self, entry: &Entry<i64>) {
        self.total = self.total.wrapping_sub(entry.data);
        self.count -= 1;
    }

    #[inline]
    fn query(&self) -> Option<i64> {
        (self.count > 0).then_some(self.total)
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NumericalDuration, SumWindow};
    use proptest::prelude::*;

    const SEC: u64 = 1_000_000_000;

    #[test]
    fn sum_test() {
        let mut agg = SumAggregator::default();
        assert_eq!(agg.query(), None);
        agg.insert(&Entry::new(10, 0));
        agg.insert(&Entry::new(-3, SEC));
        assert_eq!(agg.query(), Some(7));
        agg.evict(&Entry::new(10, 0));
        assert_eq!(agg.query(), Some(-3));
        agg.evict(&Entry::new(-3, SEC));
        assert_eq!(agg.query(), None);
        assert!(agg.is_empty());
        assert_eq!(agg.total(), 0);
    }

    #[test]
    fn sum_scenario_a_test() {
        let mut window = SumWindow::new(5.seconds());
        assert_eq!(window.receive(10, 0), 10);
        assert_eq!(window.receive(20, SEC), 30);
        assert_eq!(window.receive(30, 2 * SEC), 60);
    }

    #[test]
    fn sum_scenario_b_test() {
        let mut window = SumWindow::new(5.seconds());
        assert_eq!(window.receive(5, 0), 5);
        assert_eq!(window.receive(7, 6 * SEC), 7);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn overflow_wraps_test() {
        let mut window = SumWindow::new(5.seconds());
        assert_eq!(window.receive(i64::MAX, 0), i64::MAX);
        assert_eq!(window.receive(1, 1), i64::MIN);
        // evicting i64::MAX brings the total back in range
        assert_eq!(window.receive(2, 6 * SEC), 3);
        assert_eq!(window.aggregator().total(), 3);
    }

    proptest! {
        #[test]
        fn sum_matches_resummation(
            events in prop::collection::vec((-10_000i64..10_000, 0u64..2_000_000_000), 1..200)
        ) {
            let range = 5 * SEC;
            let mut window = SumWindow::new(5.seconds());
            let mut now = 0u64;
            let mut history: Vec<(i64, u64)> = Vec::new();

            for (value, gap) in events {
                now += gap;
                history.push((value, now));
                let reported = window.receive(value, now);
                let expected: i64 = history
                    .iter()
                    .filter(|(_, ts)| now - ts <= range)
                    .map(|(v, _)| v)
                    .sum();
                prop_assert_eq!(reported, expected);
                prop_assert_eq!(window.aggregator().total(), expected);
            }
        }
    }
}
