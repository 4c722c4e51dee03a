//! Mock implementations of the cache contract
//!
//! Provides cache doubles and call counters for testing wrappers.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cache::Cache;
use crate::error::CapacityRejected;

/// Cache that refuses every value.
///
/// # Examples
///
/// ```
/// use memokit::cache::Cache;
/// use memokit::testing::RejectingCache;
///
/// let mut cache = RejectingCache::<u8, u8>::new();
/// assert!(cache.insert(1, 1).is_err());
/// assert_eq!(cache.lookup(&1), None);
/// assert_eq!(cache.rejected(), 1);
/// ```
#[derive(Debug)]
pub struct RejectingCache<K, V> {
    lookups: usize,
    rejected: usize,
    _entries: PhantomData<fn(K) -> V>,
}

impl<K, V> Default for RejectingCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RejectingCache<K, V> {
    /// Create a new rejecting cache
    #[must_use]
    pub const fn new() -> Self {
        Self { lookups: 0, rejected: 0, _entries: PhantomData }
    }

    /// Number of lookups served (all misses)
    #[must_use]
    pub const fn lookups(&self) -> usize {
        self.lookups
    }

    /// Number of insert attempts refused
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.rejected
    }
}

impl<K, V> Cache<K, V> for RejectingCache<K, V> {
    fn lookup(&mut self, _key: &K) -> Option<V> {
        self.lookups += 1;
        None
    }

    fn insert(&mut self, _key: K, _value: V) -> Result<(), CapacityRejected> {
        self.rejected += 1;
        Err(CapacityRejected::new(1, 0))
    }

    fn clear(&mut self) {}

    fn len(&self) -> usize {
        0
    }
}

/// Cache holding at most `capacity` entries and refusing new keys once full.
///
/// Replacing the value of a key that is already stored always succeeds.
///
/// # Examples
///
/// ```
/// use memokit::cache::Cache;
/// use memokit::testing::CappedCache;
///
/// let mut cache = CappedCache::new(1);
/// assert!(cache.insert("a", 1).is_ok());
/// assert!(cache.insert("b", 2).is_err());
/// assert!(cache.insert("a", 3).is_ok());
/// assert_eq!(cache.lookup(&"a"), Some(3));
/// ```
#[derive(Debug)]
pub struct CappedCache<K, V> {
    entries: HashMap<K, V>,
    capacity: usize,
}

impl<K, V> CappedCache<K, V>
where
    K: Eq + Hash,
{
    /// Create a cache that stores at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity), capacity }
    }

    /// Maximum number of entries
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> Cache<K, V> for CappedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: K, value: V) -> Result<(), CapacityRejected> {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            return Err(CapacityRejected::new(self.entries.len() + 1, self.capacity));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Shared counter of how many times a wrapped function actually ran.
///
/// # Examples
///
/// ```
/// use memokit::testing::CallCounter;
///
/// let counter = CallCounter::new();
/// let tracked = counter.clone();
/// tracked.record();
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a counter starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation
    pub fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Invocations recorded so far
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::mocks.
    use std::thread;

    use super::*;

    /// Validates `RejectingCache` counts lookups and refusals.
    ///
    /// Assertions:
    /// - Confirms `lookups()` equals `2`.
    /// - Confirms `rejected()` equals `1`.
    /// - Ensures the cache stays empty.
    #[test]
    fn test_rejecting_cache_counts() {
        let mut cache = RejectingCache::<u32, u32>::new();
        assert_eq!(cache.lookup(&1), None);
        assert_eq!(cache.insert(1, 1), Err(CapacityRejected::new(1, 0)));
        assert_eq!(cache.lookup(&1), None);

        assert_eq!(cache.lookups(), 2);
        assert_eq!(cache.rejected(), 1);
        assert!(cache.is_empty());
    }

    /// Validates `CappedCache` refuses new keys when full.
    ///
    /// Assertions:
    /// - Confirms the rejection reports size `3` against limit `2`.
    /// - Confirms `clear` makes room again.
    #[test]
    fn test_capped_cache_capacity() {
        let mut cache = CappedCache::new(2);
        cache.insert(1, "one").unwrap();
        cache.insert(2, "two").unwrap();

        assert_eq!(cache.insert(3, "three"), Err(CapacityRejected::new(3, 2)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);

        cache.clear();
        assert!(cache.insert(3, "three").is_ok());
    }

    /// Validates `CallCounter` is shared across clones and threads.
    ///
    /// Assertions:
    /// - Confirms `count()` equals `40`.
    #[test]
    fn test_call_counter_threads() {
        let counter = CallCounter::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        counter.record();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.count(), 40);
    }
}
