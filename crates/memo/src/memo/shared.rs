//! Thread-shared memoizing wrapper.
//!
//! [`Memo`] hosts the strategies that are safe to call from many threads at
//! once: uncached, locked and condition-gated. The cache and the counters
//! live behind one `parking_lot` mutex; the wrapped function always runs with
//! that mutex released.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

use parking_lot::{Condvar, Mutex};
#[cfg(feature = "observability")]
use tracing::debug;

#[cfg(feature = "observability")]
use super::config::ExclusionKind;
use super::config::MemoConfig;
use super::select::MemoStrategy;
use super::stats::{CacheInfo, Stats};
use super::{log_hit, log_miss, log_rejection, Memoized, Slot};
use crate::cache::Cache;
use crate::error::{MemoError, MemoResult};

type ComputeFn<A, V, E> = Box<dyn Fn(&A) -> Result<V, E> + Send + Sync>;
type KeyFn<A, K> = Box<dyn Fn(&A) -> K + Send + Sync>;

/// Cache, counters and in-flight keys of the condition-gated strategy.
struct Gate<K, C> {
    cache: C,
    stats: Stats,
    pending: HashSet<K>,
}

enum SharedState<K, C> {
    Uncached(Option<Mutex<Stats>>),
    Locked(Mutex<Slot<C>>),
    Gated { gate: Mutex<Gate<K, C>>, ready: Condvar },
}

/// Releases a pending key and wakes every waiter, on success, error or
/// unwind alike.
#[cfg_attr(not(feature = "observability"), allow(dead_code))]
struct PendingGuard<'a, K, C>
where
    K: Eq + Hash,
{
    gate: &'a Mutex<Gate<K, C>>,
    ready: &'a Condvar,
    key: K,
    name: &'a str,
    stored: bool,
}

impl<K, C> Drop for PendingGuard<'_, K, C>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        #[cfg(feature = "observability")]
        {
            if !self.stored {
                debug!(memo = self.name, "computation did not complete; releasing pending key");
            }
        }
        let mut gate = self.gate.lock();
        gate.pending.remove(&self.key);
        self.ready.notify_all();
    }
}

/// Memoizing wrapper that may be shared between threads.
///
/// # Type Parameters
/// - `A`: argument type passed to [`Memoized::call`]
/// - `K`: cache key derived from the arguments
/// - `V`: value produced by the function (cloned out of the cache)
/// - `E`: failure produced by the function
/// - `C`: cache implementation (defaults to `HashMap<K, V>`)
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use std::thread;
///
/// use memokit::{Memo, MemoConfig, Memoized};
///
/// let lengths = Arc::new(
///     Memo::new(
///         |s: &String| Ok::<_, std::convert::Infallible>(s.len()),
///         |s: &String| s.clone(),
///         Some(HashMap::new()),
///         &MemoConfig::locked(),
///     )
///     .unwrap(),
/// );
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let lengths = Arc::clone(&lengths);
///         thread::spawn(move || lengths.get(&"shared".to_string()))
///     })
///     .collect();
///
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), 6);
/// }
/// ```
pub struct Memo<A, K, V, E = Infallible, C = HashMap<K, V>> {
    name: String,
    func: ComputeFn<A, V, E>,
    key: KeyFn<A, K>,
    strategy: MemoStrategy,
    state: SharedState<K, C>,
}

impl<A, V, E> Memo<A, (), V, E, HashMap<(), V>> {
    /// Wraps `func` without any cache. Every call runs the function; with
    /// `track_stats` each call counts as a miss.
    ///
    /// # Example
    /// ```
    /// use memokit::{Memo, Memoized};
    ///
    /// let double = Memo::uncached(|n: &i32| Ok::<_, std::convert::Infallible>(n * 2), true);
    /// assert_eq!(double.get(&4), 8);
    /// assert_eq!(double.cache_info().unwrap().misses, 1);
    /// ```
    pub fn uncached<F>(func: F, track_stats: bool) -> Self
    where
        F: Fn(&A) -> Result<V, E> + Send + Sync + 'static,
    {
        let strategy = MemoStrategy::select(false, None, track_stats);
        Self {
            name: MemoConfig::default().display_name().to_owned(),
            func: Box::new(func),
            key: Box::new(|_: &A| ()),
            strategy,
            state: SharedState::Uncached(track_stats.then(|| Mutex::new(Stats::new()))),
        }
    }
}

impl<A, K, V, E, C> Memo<A, K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Cache<K, V>,
{
    /// Builds a wrapper around `func`, deriving cache keys with `key`.
    ///
    /// The strategy is chosen by [`MemoStrategy::select`] from `cache`,
    /// `config.exclusion` and `config.track_stats`. Passing `None` for the
    /// cache yields an uncached wrapper regardless of the exclusion kind.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::Unsynchronized`] when a cache is supplied without
    /// an exclusion kind. Unlocked caching is only available through
    /// [`LocalMemo`](super::LocalMemo).
    pub fn new<F, G>(func: F, key: G, cache: Option<C>, config: &MemoConfig) -> MemoResult<Self>
    where
        F: Fn(&A) -> Result<V, E> + Send + Sync + 'static,
        G: Fn(&A) -> K + Send + Sync + 'static,
    {
        let strategy = MemoStrategy::select(cache.is_some(), config.exclusion, config.track_stats);
        let state = match (strategy, cache) {
            (MemoStrategy::Uncached, _) => SharedState::Uncached(None),
            (MemoStrategy::UncachedStats, _) => SharedState::Uncached(Some(Mutex::new(Stats::new()))),
            (MemoStrategy::Locked | MemoStrategy::LockedStats, Some(cache)) => {
                #[cfg(feature = "observability")]
                {
                    if config.exclusion == Some(ExclusionKind::Condition) {
                        debug!(
                            memo = config.display_name(),
                            "condition gating requires stats; using its mutex as a plain lock"
                        );
                    }
                }
                SharedState::Locked(Mutex::new(Slot::new(cache, strategy.tracks_stats())))
            }
            (MemoStrategy::ConditionGatedStats, Some(cache)) => SharedState::Gated {
                gate: Mutex::new(Gate { cache, stats: Stats::new(), pending: HashSet::new() }),
                ready: Condvar::new(),
            },
            _ => return Err(MemoError::unsynchronized(config.display_name())),
        };

        Ok(Self {
            name: config.display_name().to_owned(),
            func: Box::new(func),
            key: Box::new(key),
            strategy,
            state,
        })
    }

    /// Name from the configuration, or `"anonymous"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cached entries, or `None` for an uncached wrapper.
    #[must_use]
    pub fn cache_len(&self) -> Option<usize> {
        match &self.state {
            SharedState::Uncached(_) => None,
            SharedState::Locked(slot) => Some(slot.lock().cache.len()),
            SharedState::Gated { gate, .. } => Some(gate.lock().cache.len()),
        }
    }

    /// Number of keys currently being computed by some caller. Always `0`
    /// outside the condition-gated strategy.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        match &self.state {
            SharedState::Gated { gate, .. } => gate.lock().pending.len(),
            SharedState::Uncached(_) | SharedState::Locked(_) => 0,
        }
    }

    /// Consumes the wrapper and hands the cache back to the caller.
    #[must_use]
    pub fn into_cache(self) -> Option<C> {
        match self.state {
            SharedState::Uncached(_) => None,
            SharedState::Locked(slot) => Some(slot.into_inner().cache),
            SharedState::Gated { gate, .. } => Some(gate.into_inner().cache),
        }
    }

    fn call_locked(&self, slot: &Mutex<Slot<C>>, args: &A) -> Result<V, E> {
        let key = (self.key)(args);
        {
            let mut slot = slot.lock();
            if let Some(value) = slot.cache.lookup(&key) {
                slot.record_hit();
                log_hit(&self.name, self.strategy);
                return Ok(value);
            }
            slot.record_miss();
        }
        log_miss(&self.name, self.strategy);

        let value = (self.func)(args)?;

        // A racing caller may have stored a value meanwhile; keep theirs.
        let mut slot = slot.lock();
        match slot.cache.insert_if_absent(key, value.clone()) {
            Ok(stored) => Ok(stored),
            Err(rejected) => {
                log_rejection(&self.name, &rejected);
                Ok(value)
            }
        }
    }

    fn call_gated(&self, gate: &Mutex<Gate<K, C>>, ready: &Condvar, args: &A) -> Result<V, E> {
        let key = (self.key)(args);
        {
            let mut state = gate.lock();
            while state.pending.contains(&key) {
                #[cfg(feature = "observability")]
                debug!(memo = %self.name, "waiting for in-flight computation of the same key");
                ready.wait(&mut state);
            }
            if let Some(value) = state.cache.lookup(&key) {
                state.stats.record_hit();
                log_hit(&self.name, self.strategy);
                return Ok(value);
            }
            state.pending.insert(key.clone());
            state.stats.record_miss();
        }
        log_miss(&self.name, self.strategy);

        let mut pending = PendingGuard { gate, ready, key, name: &self.name, stored: false };
        let value = (self.func)(args)?;
        {
            let mut state = gate.lock();
            if let Err(rejected) = state.cache.insert(pending.key.clone(), value.clone()) {
                log_rejection(&self.name, &rejected);
            }
        }
        pending.stored = true;
        drop(pending);
        Ok(value)
    }
}

impl<A, K, V, E, C> Memoized<A> for Memo<A, K, V, E, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Cache<K, V>,
{
    type Output = V;
    type Error = E;

    fn call(&self, args: &A) -> Result<V, E> {
        match &self.state {
            SharedState::Uncached(stats) => {
                if let Some(stats) = stats {
                    stats.lock().record_miss();
                }
                (self.func)(args)
            }
            SharedState::Locked(slot) => self.call_locked(slot, args),
            SharedState::Gated { gate, ready } => self.call_gated(gate, ready, args),
        }
    }

    fn cache_clear(&self) {
        match &self.state {
            SharedState::Uncached(stats) => {
                if let Some(stats) = stats {
                    stats.lock().reset();
                }
            }
            SharedState::Locked(slot) => {
                let mut slot = slot.lock();
                slot.cache.clear();
                slot.reset_stats();
            }
            SharedState::Gated { gate, .. } => {
                let mut state = gate.lock();
                state.cache.clear();
                state.stats.reset();
            }
        }
    }

    fn cache_info(&self) -> Option<CacheInfo> {
        match &self.state {
            SharedState::Uncached(stats) => stats.as_ref().map(|stats| stats.lock().snapshot()),
            SharedState::Locked(slot) => slot.lock().info(),
            SharedState::Gated { gate, .. } => Some(gate.lock().stats.snapshot()),
        }
    }

    fn strategy(&self) -> MemoStrategy {
        self.strategy
    }
}

impl<A, K, V, E, C> fmt::Debug for Memo<A, K, V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
