//! [`Cache`] trait and its implementation for `HashMap`.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crate::error::CapacityRejected;

/// Bounded key-value store used by memoizing wrappers.
///
/// Implementations own their entries and any capacity policy. Wrappers treat
/// the store as opaque: they look values up, offer values for storage, and
/// clear it on request. All methods take `&mut self`; wrappers provide the
/// exclusion.
///
/// # Contract
///
/// - [`lookup`](Self::lookup) returns `None` when no value is stored for the
///   key. Implementations may update access metadata (recency, frequency).
/// - [`insert`](Self::insert) returns [`CapacityRejected`] when the value is
///   refused for capacity reasons. A rejected insert must leave any existing
///   entry for the key untouched.
/// - [`insert_if_absent`](Self::insert_if_absent) returns whichever value is
///   stored for the key once it completes.
pub trait Cache<K, V> {
    /// Returns a copy of the value stored for `key`, if any.
    fn lookup(&mut self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityRejected`] when the cache refuses the value.
    fn insert(&mut self, key: K, value: V) -> Result<(), CapacityRejected>;

    /// Stores `value` only if nothing is stored for `key` yet.
    ///
    /// Returns the value that ends up stored: the existing one when present,
    /// otherwise `value`. The default implementation is a lookup followed by
    /// an insert, so it is only atomic while the caller holds the lock that
    /// guards the cache.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityRejected`] when `key` was absent and the cache refused
    /// `value`.
    fn insert_if_absent(&mut self, key: K, value: V) -> Result<V, CapacityRejected>
    where
        V: Clone,
    {
        if let Some(existing) = self.lookup(&key) {
            return Ok(existing);
        }
        self.insert(key, value.clone())?;
        Ok(value)
    }

    /// Removes every entry.
    fn clear(&mut self);

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` when nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> Cache<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    fn lookup(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn insert(&mut self, key: K, value: V) -> Result<(), CapacityRejected> {
        HashMap::insert(self, key, value);
        Ok(())
    }

    fn insert_if_absent(&mut self, key: K, value: V) -> Result<V, CapacityRejected> {
        Ok(self.entry(key).or_insert(value).clone())
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::contract.
    use super::*;

    /// Minimal store that relies on the default `insert_if_absent`.
    #[derive(Default)]
    struct VecCache {
        entries: Vec<(u32, String)>,
        limit: usize,
    }

    impl Cache<u32, String> for VecCache {
        fn lookup(&mut self, key: &u32) -> Option<String> {
            self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        }

        fn insert(&mut self, key: u32, value: String) -> Result<(), CapacityRejected> {
            if value.len() > self.limit {
                return Err(CapacityRejected::new(value.len(), self.limit));
            }
            self.entries.retain(|(k, _)| *k != key);
            self.entries.push((key, value));
            Ok(())
        }

        fn clear(&mut self) {
            self.entries.clear();
        }

        fn len(&self) -> usize {
            self.entries.len()
        }
    }

    /// Validates `HashMap` lookup behavior for present and absent keys.
    ///
    /// Assertions:
    /// - Confirms an absent key yields `None`.
    /// - Confirms an inserted key yields its value.
    #[test]
    fn test_hashmap_lookup_and_insert() {
        let mut cache: HashMap<u32, i32> = HashMap::new();
        assert_eq!(cache.lookup(&7), None);

        Cache::insert(&mut cache, 7, 49).unwrap();
        assert_eq!(cache.lookup(&7), Some(49));
        assert_eq!(Cache::len(&cache), 1);
    }

    /// Validates `HashMap::insert_if_absent` keeps the first value.
    ///
    /// Assertions:
    /// - Confirms the first insert stores and returns `1`.
    /// - Confirms the second insert returns the existing `1`.
    #[test]
    fn test_hashmap_insert_if_absent_prefers_existing() {
        let mut cache: HashMap<&str, i32> = HashMap::new();

        assert_eq!(cache.insert_if_absent("k", 1), Ok(1));
        assert_eq!(cache.insert_if_absent("k", 2), Ok(1));
        assert_eq!(cache.lookup(&"k"), Some(1));
    }

    /// Validates `Cache::clear` on a `HashMap`.
    ///
    /// Assertions:
    /// - Ensures the cache is empty after clearing.
    #[test]
    fn test_hashmap_clear() {
        let mut cache: HashMap<u8, u8> = (0..10).map(|i| (i, i)).collect();
        Cache::clear(&mut cache);
        assert!(Cache::is_empty(&cache));
    }

    /// Validates the default `insert_if_absent` synthesized from lookup and
    /// insert.
    ///
    /// Assertions:
    /// - Confirms an absent key stores the offered value.
    /// - Confirms a present key returns the stored value.
    /// - Confirms a rejected value surfaces `CapacityRejected` and stores
    ///   nothing.
    #[test]
    fn test_default_insert_if_absent() {
        let mut cache = VecCache { limit: 3, ..VecCache::default() };

        assert_eq!(cache.insert_if_absent(1, "one".into()), Ok("one".to_string()));
        assert_eq!(cache.insert_if_absent(1, "uno".into()), Ok("one".to_string()));
        assert_eq!(cache.insert_if_absent(3, "three".into()), Err(CapacityRejected::new(5, 3)));
        assert_eq!(cache.lookup(&3), None);
        assert_eq!(cache.len(), 1);
    }
}
