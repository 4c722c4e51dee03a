//! Hit/miss accounting for memoizing wrappers.
//!
//! [`Stats`] is the mutable accumulator. It carries no synchronization of its
//! own and lives inside the state guarded by the wrapper's lock, so a cache
//! read and the counter update for that read happen in one critical section.
//! [`CacheInfo`] is the immutable snapshot handed to callers.

use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Snapshot of a wrapper's hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct CacheInfo {
    /// Calls answered from the cache
    pub hits: u64,

    /// Calls that ran the wrapped function
    pub misses: u64,
}

impl CacheInfo {
    /// Creates a snapshot from raw counts.
    #[must_use]
    pub const fn new(hits: u64, misses: u64) -> Self {
        Self { hits, misses }
    }

    /// Calculate hit rate (hits / total accesses)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate (misses / total accesses)
    #[must_use]
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Total number of calls observed (hits + misses)
    #[must_use]
    pub const fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheInfo(hits={}, misses={})", self.hits, self.misses)
    }
}

/// Mutable hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stats {
    hits: u64,
    misses: u64,
}

impl Stats {
    pub(crate) const fn new() -> Self {
        Self { hits: 0, misses: 0 }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) const fn snapshot(&self) -> CacheInfo {
        CacheInfo::new(self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for memo::stats.
    use super::*;

    /// Validates `CacheInfo::default` behavior.
    ///
    /// Assertions:
    /// - Confirms `info.hits` equals `0`.
    /// - Confirms `info.misses` equals `0`.
    #[test]
    fn test_cache_info_default() {
        let info = CacheInfo::default();
        assert_eq!(info.hits, 0);
        assert_eq!(info.misses, 0);
    }

    /// Validates the hit rate calculation.
    ///
    /// Assertions:
    /// - Ensures `(info.hit_rate() - 0.8).abs() < 1e-10` evaluates to true.
    /// - Ensures `(info.miss_rate() - 0.2).abs() < 1e-10` evaluates to true.
    /// - Confirms `info.total_accesses()` equals `100`.
    #[test]
    fn test_hit_rate_calculation() {
        let info = CacheInfo::new(80, 20);

        assert!((info.hit_rate() - 0.8).abs() < 1e-10);
        assert!((info.miss_rate() - 0.2).abs() < 1e-10);
        assert_eq!(info.total_accesses(), 100);
    }

    /// Validates the hit rate with no accesses.
    ///
    /// Assertions:
    /// - Confirms `info.hit_rate()` equals `0.0`.
    /// - Confirms `info.miss_rate()` equals `1.0`.
    #[test]
    fn test_hit_rate_no_accesses() {
        let info = CacheInfo::default();
        assert_eq!(info.hit_rate(), 0.0);
        assert_eq!(info.miss_rate(), 1.0);
    }

    #[test]
    fn test_cache_info_display() {
        assert_eq!(CacheInfo::new(3, 4).to_string(), "CacheInfo(hits=3, misses=4)");
    }

    /// Validates recording and resetting the accumulator.
    ///
    /// Assertions:
    /// - Confirms the snapshot reports two hits and one miss.
    /// - Confirms the snapshot after `reset` equals `CacheInfo::default()`.
    #[test]
    fn test_stats_record_and_reset() {
        let mut stats = Stats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot(), CacheInfo::new(2, 1));

        stats.reset();
        assert_eq!(stats.snapshot(), CacheInfo::default());
    }
}
