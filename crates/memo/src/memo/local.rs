//! Single-threaded memoizing wrapper.
//!
//! [`LocalMemo`] hosts the uncached and unlocked strategies. Its state lives
//! in `Cell`/`RefCell`, so the type is `!Sync` and the compiler rejects any
//! attempt to share it between threads. No borrow is held while the wrapped
//! function runs, which keeps re-entrant calls from inside that function
//! legal.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::select::MemoStrategy;
use super::stats::{CacheInfo, Stats};
use super::{log_hit, log_miss, log_rejection, Memoized, Slot};
use crate::cache::Cache;

type ComputeFn<A, V, E> = Box<dyn Fn(&A) -> Result<V, E>>;
type KeyFn<A, K> = Box<dyn Fn(&A) -> K>;

enum LocalState<C> {
    Uncached(Option<Cell<Stats>>),
    Unlocked(RefCell<Slot<C>>),
}

/// Memoizing wrapper for use on a single thread.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use std::convert::Infallible;
///
/// use memokit::{LocalMemo, Memoized, MemoStrategy};
///
/// let upper = LocalMemo::new(
///     |s: &&str| Ok::<_, Infallible>(s.to_uppercase()),
///     |s: &&str| s.to_string(),
///     Some(HashMap::new()),
///     false,
/// );
///
/// assert_eq!(upper.strategy(), MemoStrategy::Unlocked);
/// assert_eq!(upper.get(&"abc"), "ABC");
/// assert!(upper.cache_info().is_none());
/// ```
pub struct LocalMemo<A, K, V, E, C = HashMap<K, V>> {
    func: ComputeFn<A, V, E>,
    key: KeyFn<A, K>,
    strategy: MemoStrategy,
    state: LocalState<C>,
    name: String,
}

impl<A, K, V, E, C> LocalMemo<A, K, V, E, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Cache<K, V>,
{
    /// Builds a single-threaded wrapper around `func`.
    ///
    /// With `cache` the wrapper uses the unlocked strategy; with `None` every
    /// call runs `func`. `track_stats` enables [`Memoized::cache_info`].
    pub fn new<F, G>(func: F, key: G, cache: Option<C>, track_stats: bool) -> Self
    where
        F: Fn(&A) -> Result<V, E> + 'static,
        G: Fn(&A) -> K + 'static,
    {
        let strategy = MemoStrategy::select(cache.is_some(), None, track_stats);
        let state = match cache {
            Some(cache) => LocalState::Unlocked(RefCell::new(Slot::new(cache, track_stats))),
            None => LocalState::Uncached(track_stats.then(|| Cell::new(Stats::new()))),
        };
        Self {
            func: Box::new(func),
            key: Box::new(key),
            strategy,
            state,
            name: String::from("anonymous"),
        }
    }

    /// Sets the name reported in log events.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name reported in log events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cached entries, or `None` for an uncached wrapper.
    #[must_use]
    pub fn cache_len(&self) -> Option<usize> {
        match &self.state {
            LocalState::Uncached(_) => None,
            LocalState::Unlocked(slot) => Some(slot.borrow().cache.len()),
        }
    }

    /// Consumes the wrapper and hands the cache back to the caller.
    #[must_use]
    pub fn into_cache(self) -> Option<C> {
        match self.state {
            LocalState::Uncached(_) => None,
            LocalState::Unlocked(slot) => Some(slot.into_inner().cache),
        }
    }

    fn call_unlocked(&self, slot: &RefCell<Slot<C>>, args: &A) -> Result<V, E> {
        let key = (self.key)(args);
        {
            let mut slot = slot.borrow_mut();
            if let Some(value) = slot.cache.lookup(&key) {
                slot.record_hit();
                log_hit(&self.name, self.strategy);
                return Ok(value);
            }
            slot.record_miss();
        }
        log_miss(&self.name, self.strategy);

        let value = (self.func)(args)?;

        let stored = slot.borrow_mut().cache.insert(key, value.clone());
        if let Err(rejected) = stored {
            log_rejection(&self.name, &rejected);
        }
        Ok(value)
    }
}

impl<A, K, V, E, C> Memoized<A> for LocalMemo<A, K, V, E, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Cache<K, V>,
{
    type Output = V;
    type Error = E;

    fn call(&self, args: &A) -> Result<V, E> {
        match &self.state {
            LocalState::Uncached(stats) => {
                if let Some(stats) = stats {
                    let mut current = stats.get();
                    current.record_miss();
                    stats.set(current);
                }
                (self.func)(args)
            }
            LocalState::Unlocked(slot) => self.call_unlocked(slot, args),
        }
    }

    fn cache_clear(&self) {
        match &self.state {
            LocalState::Uncached(stats) => {
                if let Some(stats) = stats {
                    stats.set(Stats::new());
                }
            }
            LocalState::Unlocked(slot) => {
                let mut slot = slot.borrow_mut();
                slot.cache.clear();
                slot.reset_stats();
            }
        }
    }

    fn cache_info(&self) -> Option<CacheInfo> {
        match &self.state {
            LocalState::Uncached(stats) => stats.as_ref().map(|stats| stats.get().snapshot()),
            LocalState::Unlocked(slot) => slot.borrow().info(),
        }
    }

    fn strategy(&self) -> MemoStrategy {
        self.strategy
    }
}

impl<A, K, V, E, C> fmt::Debug for LocalMemo<A, K, V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMemo")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
