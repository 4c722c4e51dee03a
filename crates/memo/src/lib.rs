//! Memoizing wrappers over caller-supplied caches.
//!
//! A wrapper pairs a function with a key deriver and (optionally) a cache
//! implementing [`cache::Cache`]. Repeated calls that derive the same key are
//! served from the cache; concurrent callers are coordinated according to the
//! [`memo::MemoStrategy`] chosen at construction.
//!
//! # Wrapper Families
//!
//! - [`Memo`]: shareable across threads. Hosts the uncached, locked and
//!   condition-gated strategies.
//! - [`LocalMemo`]: single-threaded (`!Sync`). Hosts the uncached and unlocked
//!   strategies.
//! - [`MethodMemo`]: resolves the cache per call from the owning instance.
//!
//! # Feature Flags
//!
//! - `observability` (default): `tracing` events for hits, misses, capacity
//!   rejections and failed computations.
//! - `config` (default): `serde` derives and TOML loading for
//!   [`memo::MemoConfig`].
//! - `test-utils`: cache doubles and call counters in `memokit::testing` for
//!   exercising wrappers from downstream tests.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod error;
pub mod memo;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use cache::Cache;
pub use error::{CapacityRejected, MemoError, MemoResult};
pub use memo::{
    CacheInfo, ExclusionKind, LocalMemo, Memo, MemoConfig, MemoConfigBuilder, MemoStrategy,
    Memoized, MethodMemo, StatsReporter,
};
