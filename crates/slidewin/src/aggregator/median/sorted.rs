use super::{midpoint, SortKey};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Value-ordered vector of sort keys
///
/// Insertion goes to the first position whose key is not less than the new key, so equal
/// keys keep their insertion order. Removal drops the first exact match.
#[derive(Debug, Default, Clone)]
pub struct SortedIndex {
    keys: Vec<SortKey>,
}

impl SortedIndex {
    #[inline]
    pub fn insert(&mut self, key: SortKey) {
        let pos = self.keys.partition_point(|k| *k < key);
        self.keys.insert(pos, key);
    }

    pub fn remove(&mut self, key: &SortKey) -> bool {
        let pos = self.keys.partition_point(|k| k < key);
        if self.keys.get(pos) == Some(key) {
            self.keys.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn median(&self) -> Option<f64> {
        let n = self.keys.len();
        if n == 0 {
            None
        } else if n % 2 == 1 {
            Some(self.keys[n / 2].value as f64)
        } else {
            Some(midpoint(self.keys[n / 2 - 1].value, self.keys[n / 2].value))
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[cfg(test)]
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.keys.iter().map(|k| k.value)
    }
}
