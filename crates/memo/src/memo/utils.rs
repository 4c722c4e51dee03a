//! Reporting helpers for wrapper statistics.

#[cfg(feature = "observability")]
use tracing::{debug, info};

use super::Memoized;

/// Periodic reporter for a wrapper's hit/miss counters
///
/// # Example
/// ```
/// use std::collections::HashMap;
///
/// use memokit::{LocalMemo, Memoized, StatsReporter};
///
/// let memo = LocalMemo::new(
///     |n: &u8| Ok::<_, std::convert::Infallible>(u32::from(*n) + 1),
///     |n: &u8| *n,
///     Some(HashMap::new()),
///     true,
/// );
/// memo.get(&1);
/// memo.get(&1);
///
/// let reporter = StatsReporter::new("increment");
/// assert_eq!(
///     reporter.summary(&memo),
///     "increment [unlocked+stats]: hits=1 misses=1 hit_rate=50.00%"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StatsReporter {
    memo_name: String,
}

impl StatsReporter {
    /// Create a new reporter
    pub fn new(memo_name: impl Into<String>) -> Self {
        Self { memo_name: memo_name.into() }
    }

    /// One-line summary of the wrapper's strategy and counters
    pub fn summary<A, M>(&self, memo: &M) -> String
    where
        M: Memoized<A> + ?Sized,
    {
        let strategy = memo.strategy();
        match memo.cache_info() {
            Some(info) => format!(
                "{} [{}]: hits={} misses={} hit_rate={:.2}%",
                self.memo_name,
                strategy,
                info.hits,
                info.misses,
                info.hit_rate() * 100.0
            ),
            None => format!("{} [{}]: stats not tracked", self.memo_name, strategy),
        }
    }

    /// Report current counters using tracing (requires `observability`
    /// feature)
    #[cfg(feature = "observability")]
    pub fn report<A, M>(&self, memo: &M)
    where
        M: Memoized<A> + ?Sized,
    {
        let strategy = memo.strategy();
        match memo.cache_info() {
            Some(info) => {
                info!(
                    memo = %self.memo_name,
                    %strategy,
                    hits = info.hits,
                    misses = info.misses,
                    hit_rate = format!("{:.2}%", info.hit_rate() * 100.0),
                    "Memo stats report"
                );
            }
            None => {
                debug!(memo = %self.memo_name, %strategy, "Memo stats not tracked");
            }
        }
    }
}
