//! containers::hash
//!
//! Separate-chaining hash table built from [`List`] buckets.
//!
//! # Design
//!
//! Entries live in the table's own [`NodePool`]; each bucket is a list of
//! keys into that pool. The bucket count is always a power of two (at least
//! four) and is recomputed after every insert and delete so that buckets
//! hold about two entries each. New entries go to the front of their bucket.
//!
//! Equal values may coexist: [`HashTable::insert`] never evicts. Use
//! [`HashTable::replace`] to swap out an equal entry; the evicted payload
//! is handed back to the caller.
//!
//! # Example
//!
//! ```
//! use slotwise::containers::hash::HashTable;
//!
//! let mut table = HashTable::new();
//! table.insert(4_i64).unwrap();
//! table.apply(|v| *v = *v * *v);
//! assert_eq!(table.find(&16), Some(&16));
//! assert_eq!(table.delete_value(&16), Some(16));
//! assert!(table.is_empty());
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use super::list::{List, NodeKey, NodePool};
use super::ContainerError;

const MIN_BUCKETS: usize = 4;
const BEST_ELEMS_PER_BUCKET: usize = 2;

/// Chained hash table over an owned node pool.
pub struct HashTable<T, S = FxBuildHasher> {
    pool: NodePool<T>,
    buckets: Vec<List<T>>,
    hasher: S,
}

impl<T: Hash + Eq> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> HashTable<T> {
    /// Creates an empty, unbounded table.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates an empty table holding at most `limit` entries.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self::with_hasher(limit, FxBuildHasher)
    }
}

impl<T: Hash + Eq, S: BuildHasher> HashTable<T, S> {
    /// Creates an empty table with a custom hasher.
    pub fn with_hasher(limit: Option<usize>, hasher: S) -> Self {
        Self {
            pool: NodePool::with_limit(limit),
            buckets: Self::empty_buckets(MIN_BUCKETS),
            hasher,
        }
    }

    fn empty_buckets(count: usize) -> Vec<List<T>> {
        (0..count).map(|_| List::new()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.pool.live()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, value: &T) -> usize {
        (self.hasher.hash_one(value) as usize) & (self.buckets.len() - 1)
    }

    /// Finds `value` in the bucket its hash selects.
    fn locate(&self, value: &T) -> Option<(usize, NodeKey)> {
        let bucket = self.bucket_of(value);
        self.buckets[bucket]
            .keys(&self.pool)
            .find(|&key| self.pool.get(key) == Some(value))
            .map(|key| (bucket, key))
    }

    /// Finds the first entry equal to `value` by visiting every bucket.
    fn scan(&self, value: &T) -> Option<(usize, NodeKey)> {
        self.buckets.iter().enumerate().find_map(|(bucket, list)| {
            list.keys(&self.pool)
                .find(|&key| self.pool.get(key) == Some(value))
                .map(|key| (bucket, key))
        })
    }

    /// Adds a new entry. Equal entries already present are kept.
    pub fn insert(&mut self, value: T) -> Result<(), ContainerError> {
        let bucket = self.bucket_of(&value);
        self.buckets[bucket].push_front(&mut self.pool, value)?;
        self.rehash();
        Ok(())
    }

    /// Adds a new entry, evicting and returning one equal entry if present.
    #[must_use = "the evicted entry is owned by the caller"]
    pub fn replace(&mut self, value: T) -> Result<Option<T>, ContainerError> {
        let bucket = self.bucket_of(&value);
        let evicted = self
            .locate(&value)
            .map(|(old_bucket, key)| self.buckets[old_bucket].remove(&mut self.pool, key));
        self.buckets[bucket].push_front(&mut self.pool, value)?;
        self.rehash();
        Ok(evicted)
    }

    /// Looks `value` up through its bucket.
    pub fn find(&self, value: &T) -> Option<&T> {
        self.locate(value).and_then(|(_, key)| self.pool.get(key))
    }

    /// Removes and returns the first entry equal to `value`, found by a full
    /// scan of every bucket.
    pub fn delete_value(&mut self, value: &T) -> Option<T> {
        let (bucket, key) = self.scan(value)?;
        let removed = self.buckets[bucket].remove(&mut self.pool, key);
        self.rehash();
        Some(removed)
    }

    /// Rewrites every entry in place, then moves entries whose bucket changed.
    pub fn apply<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let keys: Vec<NodeKey> = self.keys().collect();
        for key in keys {
            if let Some(value) = self.pool.get_mut(key) {
                f(value);
            }
        }
        self.redistribute(self.buckets.len());
    }

    /// Releases every entry, returning how many were freed.
    pub fn clear(&mut self) -> usize {
        let mut released = 0;
        for bucket in &mut self.buckets {
            released += bucket.clear(&mut self.pool);
        }
        self.buckets = Self::empty_buckets(MIN_BUCKETS);
        released
    }

    /// Iterates entries bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets
            .iter()
            .flat_map(move |bucket| bucket.iter(&self.pool))
    }

    fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.buckets
            .iter()
            .flat_map(move |bucket| bucket.keys(&self.pool))
    }

    /// Resizes so buckets hold about [`BEST_ELEMS_PER_BUCKET`] entries.
    fn rehash(&mut self) {
        let mut target = (self.len() / BEST_ELEMS_PER_BUCKET).max(MIN_BUCKETS);
        // Round down to a power of two.
        while !target.is_power_of_two() {
            target &= target - 1;
        }
        if target != self.buckets.len() {
            self.redistribute(target);
        }
    }

    /// Rebuilds `count` buckets, moving every entry to the bucket its
    /// current value hashes to.
    fn redistribute(&mut self, count: usize) {
        let old = std::mem::replace(&mut self.buckets, Self::empty_buckets(count));
        for mut bucket in old {
            while let Some(key) = bucket.front_key() {
                let target = match self.pool.get(key) {
                    Some(value) => self.bucket_of(value),
                    None => break,
                };
                bucket.transfer_front(&mut self.pool, &mut self.buckets[target]);
            }
        }
    }
}

impl<T, S> fmt::Debug for HashTable<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.pool.live())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(table: &HashTable<i64>) -> Vec<i64> {
        let mut out: Vec<i64> = table.iter().copied().collect();
        out.sort();
        out
    }

    #[test]
    fn insert_and_find() {
        let mut table = HashTable::new();
        table.insert(5).unwrap();
        assert_eq!(table.find(&5), Some(&5));
        assert_eq!(table.find(&6), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_keeps_duplicates() {
        let mut table = HashTable::new();
        table.insert(7).unwrap();
        table.insert(7).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(sorted(&table), vec![7, 7]);
    }

    #[test]
    fn replace_hands_back_old_entry() {
        let mut table = HashTable::new();
        assert_eq!(table.replace(3).unwrap(), None);
        assert_eq!(table.replace(3).unwrap(), Some(3));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn delete_by_value() {
        let mut table = HashTable::new();
        for v in [1, 2, 3] {
            table.insert(v).unwrap();
        }
        assert_eq!(table.delete_value(&2), Some(2));
        assert_eq!(table.delete_value(&2), None);
        assert_eq!(sorted(&table), vec![1, 3]);
    }

    #[test]
    fn grows_and_shrinks_buckets() {
        let mut table = HashTable::new();
        assert_eq!(table.bucket_count(), 4);
        for v in 0..64 {
            table.insert(v).unwrap();
        }
        assert_eq!(table.bucket_count(), 32);
        assert!(table.bucket_count().is_power_of_two());
        for v in 0..64 {
            assert_eq!(table.find(&v), Some(&v));
        }
        for v in 0..60 {
            table.delete_value(&v);
        }
        assert_eq!(table.bucket_count(), 4);
        assert_eq!(sorted(&table), vec![60, 61, 62, 63]);
    }

    #[test]
    fn apply_rebuckets_transformed_entries() {
        let mut table = HashTable::new();
        for v in 1..=10 {
            table.insert(v).unwrap();
        }
        table.apply(|v| *v = *v * *v * *v);
        for v in 1..=10_i64 {
            let cube = v * v * v;
            assert_eq!(table.find(&cube), Some(&cube));
        }
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn clear_releases_entries() {
        let mut table = HashTable::new();
        for v in 0..20 {
            table.insert(v).unwrap();
        }
        assert_eq!(table.clear(), 20);
        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), 4);
    }

    #[test]
    fn limit_is_enforced() {
        let mut table = HashTable::with_limit(Some(1));
        table.insert(1).unwrap();
        assert_eq!(table.insert(2), Err(ContainerError::Full { limit: 1 }));
        assert_eq!(table.replace(1).unwrap(), Some(1));
        assert!(table.replace(2).is_err());
        assert_eq!(sorted(&table), vec![1]);
    }
}
