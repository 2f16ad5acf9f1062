use super::{midpoint, SortKey};

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

/// Ordered multiset of sort keys split into a lower and an upper half
///
/// Invariants:
/// - every key in `lower` is less than or equal to every key in `upper`
/// - `lower` holds either the same number of keys as `upper` or exactly one more
///
/// The median is therefore read from the largest lower key and, for an even count, the
/// smallest upper key. Keys map to their multiplicity so identical entries are supported.
#[derive(Debug, Default, Clone)]
pub struct SplitIndex {
    lower: BTreeMap<SortKey, usize>,
    upper: BTreeMap<SortKey, usize>,
    lower_len: usize,
    upper_len: usize,
}

impl SplitIndex {
    pub fn insert(&mut self, key: SortKey) {
        if self.lower_max().map_or(true, |max| key <= max) {
            add(&mut self.lower, key);
            self.lower_len += 1;
        } else {
            add(&mut self.upper, key);
            self.upper_len += 1;
        }
        self.rebalance();
    }

    pub fn remove(&mut self, key: &SortKey) -> bool {
        let removed = if self.lower_max().is_some_and(|max| *key <= max) {
            let removed = take(&mut self.lower, key);
            self.lower_len -= removed as usize;
            removed
        } else {
            let removed = take(&mut self.upper, key);
            self.upper_len -= removed as usize;
            removed
        };
        if removed {
            self.rebalance();
        }
        removed
    }

    pub fn median(&self) -> Option<f64> {
        let low = self.lower_max()?;
        if self.lower_len > self.upper_len {
            Some(low.value as f64)
        } else {
            let high = self.upper_min()?;
            Some(midpoint(low.value, high.value))
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lower_len + self.upper_len
    }

    #[inline]
    fn lower_max(&self) -> Option<SortKey> {
        self.lower.last_key_value().map(|(k, _)| *k)
    }

    #[inline]
    fn upper_min(&self) -> Option<SortKey> {
        self.upper.first_key_value().map(|(k, _)| *k)
    }

    fn rebalance(&mut self) {
        while self.lower_len > self.upper_len + 1 {
            let Some(max) = self.lower_max() else { break };
            take(&mut self.lower, &max);
            add(&mut self.upper, max);
            self.lower_len -= 1;
            self.upper_len += 1;
        }
        while self.upper_len > self.lower_len {
            let Some(min) = self.upper_min() else { break };
            take(&mut self.upper, &min);
            add(&mut self.lower, min);
            self.upper_len -= 1;
            self.lower_len += 1;
        }
    }
}

#[inline]
fn add(map: &mut BTreeMap<SortKey, usize>, key: SortKey) {
    *map.entry(key).or_insert(0) += 1;
}

#[inline]
fn take(map: &mut BTreeMap<SortKey, usize>, key: &SortKey) -> bool {
    match map.get_mut(key) {
        Some(count) if *count > 1 => {
            *count -= 1;
            true
        }
        Some(_) => {
            map.remove(key);
            true
        }
        None => false,
    }
}
