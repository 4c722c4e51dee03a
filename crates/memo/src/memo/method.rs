//! Method-bound memoizing wrapper.
//!
//! A [`MethodMemo`] is defined once per method, but the cache it uses belongs
//! to each instance. On every call an accessor resolves the instance's cache;
//! an instance that returns `None` opts out of caching and the method simply
//! runs. The locked variant resolves a `parking_lot::Mutex` around the cache,
//! the unlocked variant a `RefCell`.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use super::select::MemoStrategy;
use super::stats::CacheInfo;
use super::{log_hit, log_miss, log_rejection};
use crate::cache::Cache;

type MethodFn<S, A, V, E> = Box<dyn Fn(&S, &A) -> Result<V, E> + Send + Sync>;
type MethodKeyFn<S, A, K> = Box<dyn Fn(&S, &A) -> K + Send + Sync>;
type LockedAccess<S, C> = Box<dyn for<'s> Fn(&'s S) -> Option<&'s Mutex<C>> + Send + Sync>;
type UnlockedAccess<S, C> = Box<dyn for<'s> Fn(&'s S) -> Option<&'s RefCell<C>> + Send + Sync>;

enum CacheAccess<S, C> {
    Unlocked(UnlockedAccess<S, C>),
    Locked(LockedAccess<S, C>),
}

/// Memoizing wrapper for a method whose cache lives on the instance.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use std::convert::Infallible;
///
/// use memokit::MethodMemo;
/// use parking_lot::Mutex;
///
/// struct Catalog {
///     markup: u32,
///     prices: Option<Mutex<HashMap<u32, u32>>>,
/// }
///
/// fn prices(catalog: &Catalog) -> Option<&Mutex<HashMap<u32, u32>>> {
///     catalog.prices.as_ref()
/// }
///
/// let price = MethodMemo::locked(
///     |catalog: &Catalog, base: &u32| Ok::<_, Infallible>(base + catalog.markup),
///     |_: &Catalog, base: &u32| *base,
///     prices,
/// );
///
/// let cached = Catalog { markup: 5, prices: Some(Mutex::new(HashMap::new())) };
/// let uncached = Catalog { markup: 7, prices: None };
///
/// assert_eq!(price.call(&cached, &10), Ok(15));
/// assert_eq!(price.call(&uncached, &10), Ok(17));
/// assert_eq!(cached.prices.as_ref().unwrap().lock().len(), 1);
/// ```
pub struct MethodMemo<S, A, K, V, E, C> {
    method: MethodFn<S, A, V, E>,
    key: MethodKeyFn<S, A, K>,
    access: CacheAccess<S, C>,
    name: String,
}

impl<S, A, K, V, E, C> MethodMemo<S, A, K, V, E, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Cache<K, V>,
{
    /// Builds a wrapper whose per-instance cache is guarded by a mutex.
    ///
    /// Concurrent misses may compute twice; the first stored value wins.
    pub fn locked<F, G, H>(method: F, key: G, cache: H) -> Self
    where
        F: Fn(&S, &A) -> Result<V, E> + Send + Sync + 'static,
        G: Fn(&S, &A) -> K + Send + Sync + 'static,
        H: for<'s> Fn(&'s S) -> Option<&'s Mutex<C>> + Send + Sync + 'static,
    {
        Self {
            method: Box::new(method),
            key: Box::new(key),
            access: CacheAccess::Locked(Box::new(cache)),
            name: String::from("anonymous"),
        }
    }

    /// Builds a wrapper whose per-instance cache is a `RefCell`. Instances
    /// holding such a cache are `!Sync`, so calls stay on one thread.
    pub fn unlocked<F, G, H>(method: F, key: G, cache: H) -> Self
    where
        F: Fn(&S, &A) -> Result<V, E> + Send + Sync + 'static,
        G: Fn(&S, &A) -> K + Send + Sync + 'static,
        H: for<'s> Fn(&'s S) -> Option<&'s RefCell<C>> + Send + Sync + 'static,
    {
        Self {
            method: Box::new(method),
            key: Box::new(key),
            access: CacheAccess::Unlocked(Box::new(cache)),
            name: String::from("anonymous"),
        }
    }

    /// Sets the name reported in log events.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Calls the method on `instance` through that instance's cache.
    ///
    /// # Errors
    ///
    /// Returns the method's own error, unchanged. Failures are never cached.
    pub fn call(&self, instance: &S, args: &A) -> Result<V, E> {
        match &self.access {
            CacheAccess::Unlocked(access) => match access(instance) {
                Some(cache) => self.call_unlocked(cache, instance, args),
                None => (self.method)(instance, args),
            },
            CacheAccess::Locked(access) => match access(instance) {
                Some(cache) => self.call_locked(cache, instance, args),
                None => (self.method)(instance, args),
            },
        }
    }

    /// Empties `instance`'s cache, if it has one.
    pub fn cache_clear(&self, instance: &S) {
        match &self.access {
            CacheAccess::Unlocked(access) => {
                if let Some(cache) = access(instance) {
                    cache.borrow_mut().clear();
                }
            }
            CacheAccess::Locked(access) => {
                if let Some(cache) = access(instance) {
                    cache.lock().clear();
                }
            }
        }
    }

    /// Always `None`: method-bound wrappers do not count hits and misses.
    #[must_use]
    pub fn cache_info(&self) -> Option<CacheInfo> {
        None
    }

    /// [`MemoStrategy::Locked`] or [`MemoStrategy::Unlocked`].
    #[must_use]
    pub fn strategy(&self) -> MemoStrategy {
        match self.access {
            CacheAccess::Unlocked(_) => MemoStrategy::Unlocked,
            CacheAccess::Locked(_) => MemoStrategy::Locked,
        }
    }

    fn call_unlocked(&self, cache: &RefCell<C>, instance: &S, args: &A) -> Result<V, E> {
        let key = (self.key)(instance, args);
        let cached = cache.borrow_mut().lookup(&key);
        if let Some(value) = cached {
            log_hit(&self.name, MemoStrategy::Unlocked);
            return Ok(value);
        }
        log_miss(&self.name, MemoStrategy::Unlocked);

        let value = (self.method)(instance, args)?;

        let stored = cache.borrow_mut().insert(key, value.clone());
        if let Err(rejected) = stored {
            log_rejection(&self.name, &rejected);
        }
        Ok(value)
    }

    fn call_locked(&self, cache: &Mutex<C>, instance: &S, args: &A) -> Result<V, E> {
        let key = (self.key)(instance, args);
        let cached = cache.lock().lookup(&key);
        if let Some(value) = cached {
            log_hit(&self.name, MemoStrategy::Locked);
            return Ok(value);
        }
        log_miss(&self.name, MemoStrategy::Locked);

        let value = (self.method)(instance, args)?;

        // A racing caller may have stored a value meanwhile; keep theirs.
        let stored = cache.lock().insert_if_absent(key, value.clone());
        match stored {
            Ok(stored) => Ok(stored),
            Err(rejected) => {
                log_rejection(&self.name, &rejected);
                Ok(value)
            }
        }
    }
}

impl<S, A, K, V, E, C> fmt::Debug for MethodMemo<S, A, K, V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            CacheAccess::Unlocked(_) => "unlocked",
            CacheAccess::Locked(_) => "locked",
        };
        f.debug_struct("MethodMemo")
            .field("name", &self.name)
            .field("access", &access)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for memo::method.
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::testing::mocks::RejectingCache;

    struct Scorer {
        bonus: u64,
        evaluations: Cell<u32>,
        cache: Option<RefCell<HashMap<u64, u64>>>,
    }

    impl Scorer {
        fn new(bonus: u64, cached: bool) -> Self {
            Self {
                bonus,
                evaluations: Cell::new(0),
                cache: cached.then(|| RefCell::new(HashMap::new())),
            }
        }
    }

    fn scorer_cache(scorer: &Scorer) -> Option<&RefCell<HashMap<u64, u64>>> {
        scorer.cache.as_ref()
    }

    fn score(scorer: &Scorer, points: &u64) -> Result<u64, String> {
        scorer.evaluations.set(scorer.evaluations.get() + 1);
        if *points == 0 {
            return Err("no points".into());
        }
        Ok(points * 10 + scorer.bonus)
    }

    fn points_key(_: &Scorer, points: &u64) -> u64 {
        *points
    }

    /// Validates instances with and without a cache behave independently.
    ///
    /// Assertions:
    /// - Confirms the uncached instance evaluates on every call.
    /// - Confirms the cached instance evaluates once per key.
    /// - Confirms each instance sees its own bonus.
    #[test]
    fn test_unlocked_per_instance_cache() {
        let memo = MethodMemo::unlocked(score, points_key, scorer_cache);
        let plain = Scorer::new(1, false);
        let cached = Scorer::new(2, true);

        for _ in 0..3 {
            assert_eq!(memo.call(&plain, &4), Ok(41));
            assert_eq!(memo.call(&cached, &4), Ok(42));
        }

        assert_eq!(plain.evaluations.get(), 3);
        assert_eq!(cached.evaluations.get(), 1);
        assert_eq!(cached.cache.as_ref().unwrap().borrow().len(), 1);
        assert_eq!(memo.strategy(), MemoStrategy::Unlocked);
        assert_eq!(memo.cache_info(), None);
    }

    /// Validates `cache_clear` only touches the given instance.
    ///
    /// Assertions:
    /// - Confirms clearing an uncached instance is a no-op.
    /// - Confirms clearing forces a re-evaluation.
    #[test]
    fn test_unlocked_cache_clear() {
        let memo = MethodMemo::unlocked(score, points_key, scorer_cache);
        let plain = Scorer::new(0, false);
        let cached = Scorer::new(0, true);

        memo.call(&cached, &1).unwrap();
        memo.cache_clear(&plain);
        memo.call(&cached, &1).unwrap();
        assert_eq!(cached.evaluations.get(), 1);

        memo.cache_clear(&cached);
        memo.call(&cached, &1).unwrap();
        assert_eq!(cached.evaluations.get(), 2);
    }

    /// Validates failures propagate without being cached.
    ///
    /// Assertions:
    /// - Confirms the error is returned on each call.
    /// - Confirms the cache stays empty.
    #[test]
    fn test_unlocked_failure_not_cached() {
        let memo = MethodMemo::unlocked(score, points_key, scorer_cache);
        let cached = Scorer::new(0, true);

        assert_eq!(memo.call(&cached, &0), Err("no points".to_string()));
        assert_eq!(memo.call(&cached, &0), Err("no points".to_string()));
        assert_eq!(cached.evaluations.get(), 2);
        assert!(cached.cache.as_ref().unwrap().borrow().is_empty());
    }

    struct Ledger {
        cache: Mutex<RejectingCache<u64, u64>>,
    }

    fn ledger_cache(ledger: &Ledger) -> Option<&Mutex<RejectingCache<u64, u64>>> {
        Some(&ledger.cache)
    }

    /// Validates the locked variant absorbs capacity rejections.
    ///
    /// Assertions:
    /// - Confirms the computed value is returned.
    /// - Confirms every insert attempt reached the cache.
    #[test]
    fn test_locked_capacity_rejection() {
        let memo = MethodMemo::locked(
            |_: &Ledger, n: &u64| Ok::<_, String>(n + 1),
            |_: &Ledger, n: &u64| *n,
            ledger_cache,
        )
        .named("ledger");
        let ledger = Ledger { cache: Mutex::new(RejectingCache::new()) };

        assert_eq!(memo.call(&ledger, &1), Ok(2));
        assert_eq!(memo.call(&ledger, &1), Ok(2));
        assert_eq!(ledger.cache.lock().rejected(), 2);
        assert_eq!(memo.strategy(), MemoStrategy::Locked);
    }

    /// Validates the unlocked variant absorbs capacity rejections.
    ///
    /// Assertions:
    /// - Confirms the computed value is returned on every call.
    /// - Confirms each call looked up and attempted an insert.
    #[test]
    fn test_unlocked_capacity_rejection() {
        struct Gauge {
            cache: RefCell<RejectingCache<u64, u64>>,
        }

        fn gauge_cache(gauge: &Gauge) -> Option<&RefCell<RejectingCache<u64, u64>>> {
            Some(&gauge.cache)
        }

        let memo = MethodMemo::unlocked(
            |_: &Gauge, n: &u64| Ok::<_, String>(n * 2),
            |_: &Gauge, n: &u64| *n,
            gauge_cache,
        );
        let gauge = Gauge { cache: RefCell::new(RejectingCache::new()) };

        for _ in 0..3 {
            assert_eq!(memo.call(&gauge, &5), Ok(10));
        }
        assert_eq!(gauge.cache.borrow().lookups(), 3);
        assert_eq!(gauge.cache.borrow().rejected(), 3);
    }

    struct Desk {
        cache: Mutex<HashMap<u64, u64>>,
        both_missed: Barrier,
        sequence: AtomicU64,
    }

    fn desk_cache(desk: &Desk) -> Option<&Mutex<HashMap<u64, u64>>> {
        Some(&desk.cache)
    }

    /// Validates first-writer-wins when two locked callers miss together.
    ///
    /// Each caller computes a distinct value and only stores after both
    /// have missed, so exactly one store succeeds.
    ///
    /// Assertions:
    /// - Confirms both threads return the same value.
    /// - Confirms the instance cache holds that value.
    /// - Confirms the method ran twice.
    #[test]
    fn test_locked_race_keeps_first_stored_value() {
        let memo = MethodMemo::locked(
            |desk: &Desk, _: &u64| {
                let value = desk.sequence.fetch_add(1, Ordering::SeqCst);
                desk.both_missed.wait();
                Ok::<_, String>(value)
            },
            |_: &Desk, n: &u64| *n,
            desk_cache,
        );
        let desk = Desk {
            cache: Mutex::new(HashMap::new()),
            both_missed: Barrier::new(2),
            sequence: AtomicU64::new(0),
        };

        let results: Vec<u64> = thread::scope(|scope| {
            let handles: Vec<_> =
                (0..2).map(|_| scope.spawn(|| memo.call(&desk, &3).unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results[0], results[1]);
        assert_eq!(desk.cache.lock().get(&3), Some(&results[0]));
        assert_eq!(desk.sequence.load(Ordering::SeqCst), 2);
        assert_eq!(memo.call(&desk, &3), Ok(results[0]));
    }
}
