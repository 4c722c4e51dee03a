//! Memoizing wrappers
//!
//! This module turns a function plus a key deriver into a wrapper that serves
//! repeated calls from a [`Cache`](crate::cache::Cache). The behavior of a
//! wrapper is fixed at construction by [`MemoStrategy::select`]:
//!
//! - **Uncached**: always calls the function (optionally counting misses).
//! - **Unlocked**: single-threaded caching, see [`LocalMemo`].
//! - **Locked**: the cache is read and written under a mutex, the function
//!   runs outside it. Concurrent misses on one key may compute twice; the
//!   first stored value wins.
//! - **Condition-gated**: like locked, but a missing key is computed by one
//!   caller at a time while the others wait for it.
//! - **Method-bound**: the cache is looked up per call on the owning
//!   instance, see [`MethodMemo`].
//!
//! Capacity rejections from the cache are absorbed: the computed value is
//! still returned, it just is not retained. Failures of the wrapped function
//! are never cached and propagate unchanged.
//!
//! # Examples
//!
//! ## Shared, de-duplicating wrapper
//! ```
//! use std::collections::HashMap;
//! use std::convert::Infallible;
//!
//! use memokit::{Memo, MemoConfig, Memoized};
//!
//! let square = Memo::new(
//!     |n: &u64| Ok::<_, Infallible>(n * n),
//!     |n: &u64| *n,
//!     Some(HashMap::new()),
//!     &MemoConfig::deduplicated(),
//! )
//! .unwrap();
//!
//! assert_eq!(square.get(&12), 144);
//! assert_eq!(square.get(&12), 144);
//!
//! let info = square.cache_info().unwrap();
//! assert_eq!((info.hits, info.misses), (1, 1));
//! ```
//!
//! ## Single-threaded wrapper
//! ```
//! use std::collections::HashMap;
//!
//! use memokit::{LocalMemo, Memoized};
//!
//! let parse = LocalMemo::new(
//!     |s: &String| s.parse::<i64>(),
//!     |s: &String| s.clone(),
//!     Some(HashMap::new()),
//!     true,
//! );
//!
//! assert_eq!(parse.call(&"42".to_string()), Ok(42));
//! assert!(parse.call(&"forty-two".to_string()).is_err());
//! assert_eq!(parse.cache_info().unwrap().misses, 2);
//! ```

mod config;
mod local;
mod method;
mod select;
mod shared;
mod stats;
mod utils;

pub use config::{ExclusionKind, MemoConfig, MemoConfigBuilder};
pub use local::LocalMemo;
pub use method::MethodMemo;
pub use select::MemoStrategy;
pub use shared::Memo;
pub use stats::CacheInfo;
pub use utils::StatsReporter;

use std::convert::Infallible;

#[cfg(feature = "observability")]
use tracing::{debug, trace};

use crate::error::CapacityRejected;
use stats::Stats;

/// Common surface of memoizing wrappers.
pub trait Memoized<A> {
    /// Value produced by the wrapped function
    type Output;

    /// Failure produced by the wrapped function
    type Error;

    /// Calls the wrapped function through the cache.
    ///
    /// # Errors
    ///
    /// Returns the wrapped function's own error, unchanged. Failures are
    /// never cached.
    fn call(&self, args: &A) -> Result<Self::Output, Self::Error>;

    /// Empties the cache (if any) and resets the counters (if tracked).
    fn cache_clear(&self);

    /// Current hit/miss counters, or `None` when statistics were not
    /// requested at construction.
    fn cache_info(&self) -> Option<CacheInfo>;

    /// The strategy selected at construction.
    fn strategy(&self) -> MemoStrategy;

    /// Calls a wrapper whose function cannot fail.
    fn get(&self, args: &A) -> Self::Output
    where
        Self::Error: Into<Infallible>,
    {
        match self.call(args) {
            Ok(value) => value,
            Err(err) => match Into::<Infallible>::into(err) {},
        }
    }
}

/// A cache together with its optional counters, guarded as one unit.
#[derive(Debug)]
pub(crate) struct Slot<C> {
    pub(crate) cache: C,
    stats: Option<Stats>,
}

impl<C> Slot<C> {
    pub(crate) fn new(cache: C, track_stats: bool) -> Self {
        Self { cache, stats: track_stats.then(Stats::new) }
    }

    pub(crate) fn record_hit(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.record_hit();
        }
    }

    pub(crate) fn record_miss(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.record_miss();
        }
    }

    pub(crate) fn reset_stats(&mut self) {
        if let Some(stats) = self.stats.as_mut() {
            stats.reset();
        }
    }

    pub(crate) fn info(&self) -> Option<CacheInfo> {
        self.stats.as_ref().map(Stats::snapshot)
    }
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub(crate) fn log_hit(name: &str, strategy: MemoStrategy) {
    #[cfg(feature = "observability")]
    trace!(memo = name, %strategy, "cache hit");
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub(crate) fn log_miss(name: &str, strategy: MemoStrategy) {
    #[cfg(feature = "observability")]
    trace!(memo = name, %strategy, "cache miss");
}

#[cfg_attr(not(feature = "observability"), allow(unused_variables))]
pub(crate) fn log_rejection(name: &str, rejected: &CapacityRejected) {
    #[cfg(feature = "observability")]
    debug!(
        memo = name,
        size = rejected.size,
        limit = rejected.limit,
        "cache rejected computed value; returning it unstored"
    );
}
