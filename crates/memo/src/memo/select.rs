//! Strategy selection.
//!
//! A wrapper's behavior is decided once, at construction, from three inputs:
//! whether a cache was supplied, which [`ExclusionKind`] (if any) guards it,
//! and whether statistics were requested.

use std::fmt;

use super::config::ExclusionKind;

/// The per-call behavior of a memoizing wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoStrategy {
    /// Every call runs the function.
    Uncached,
    /// Every call runs the function and counts a miss.
    UncachedStats,
    /// Cache without locking. Single-threaded only.
    Unlocked,
    /// Cache without locking, with hit/miss counters.
    UnlockedStats,
    /// Mutex-guarded cache; concurrent misses may compute twice, first
    /// stored value wins.
    Locked,
    /// Mutex-guarded cache with hit/miss counters.
    LockedStats,
    /// Condition-gated cache that lets one caller compute a missing key while
    /// the others wait, with hit/miss counters.
    ConditionGatedStats,
}

impl MemoStrategy {
    /// Picks the strategy for the given construction inputs.
    ///
    /// | cache | exclusion | stats | strategy |
    /// |---|---|---|---|
    /// | no | any | yes | `UncachedStats` |
    /// | no | any | no | `Uncached` |
    /// | yes | none | yes | `UnlockedStats` |
    /// | yes | none | no | `Unlocked` |
    /// | yes | plain | yes | `LockedStats` |
    /// | yes | plain | no | `Locked` |
    /// | yes | condition | yes | `ConditionGatedStats` |
    /// | yes | condition | no | `Locked` |
    ///
    /// Condition gating always counts hits and misses; without stats the
    /// condition's mutex serves as a plain lock.
    ///
    /// # Example
    /// ```
    /// use memokit::{ExclusionKind, MemoStrategy};
    ///
    /// let strategy = MemoStrategy::select(true, Some(ExclusionKind::Condition), true);
    /// assert_eq!(strategy, MemoStrategy::ConditionGatedStats);
    /// ```
    #[must_use]
    pub const fn select(has_cache: bool, exclusion: Option<ExclusionKind>, track_stats: bool) -> Self {
        match (has_cache, exclusion, track_stats) {
            (false, _, true) => Self::UncachedStats,
            (false, _, false) => Self::Uncached,
            (true, None, true) => Self::UnlockedStats,
            (true, None, false) => Self::Unlocked,
            (true, Some(ExclusionKind::Plain), true) => Self::LockedStats,
            (true, Some(ExclusionKind::Plain | ExclusionKind::Condition), false) => Self::Locked,
            (true, Some(ExclusionKind::Condition), true) => Self::ConditionGatedStats,
        }
    }

    /// Returns `true` if calls consult a cache.
    #[must_use]
    pub const fn is_cached(self) -> bool {
        !matches!(self, Self::Uncached | Self::UncachedStats)
    }

    /// Returns `true` if the wrapper counts hits and misses.
    #[must_use]
    pub const fn tracks_stats(self) -> bool {
        matches!(
            self,
            Self::UncachedStats | Self::UnlockedStats | Self::LockedStats | Self::ConditionGatedStats
        )
    }

    /// Returns `true` if the strategy may be shared between threads.
    #[must_use]
    pub const fn is_thread_safe(self) -> bool {
        !matches!(self, Self::Unlocked | Self::UnlockedStats)
    }
}

impl fmt::Display for MemoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uncached => "uncached",
            Self::UncachedStats => "uncached+stats",
            Self::Unlocked => "unlocked",
            Self::UnlockedStats => "unlocked+stats",
            Self::Locked => "locked",
            Self::LockedStats => "locked+stats",
            Self::ConditionGatedStats => "condition-gated+stats",
        };
        f.write_str(name)
    }
}
