//! Error types for memokit.
//!
//! Two kinds of failure exist in this crate:
//!
//! 1. **[`CapacityRejected`]**: returned by a [`Cache`](crate::cache::Cache)
//!    when it refuses to store a value. Wrappers always recover from it
//!    locally; callers of a memoized function never see it.
//! 2. **[`MemoError`]**: returned when a wrapper or its configuration cannot
//!    be constructed.
//!
//! Failures of the wrapped function itself are not represented here. They are
//! the function's own error type and propagate through
//! [`Memoized::call`](crate::memo::Memoized::call) unchanged.

use thiserror::Error;

/// Result type for wrapper construction and configuration loading.
pub type MemoResult<T> = Result<T, MemoError>;

/// Signal returned by a cache that refuses to store a value.
///
/// `size` is the weight the cache assigned to the rejected value and `limit`
/// is the bound it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value of size {size} rejected by cache with capacity {limit}")]
pub struct CapacityRejected {
    /// Weight of the rejected value
    pub size: usize,
    /// Capacity bound the value was checked against
    pub limit: usize,
}

impl CapacityRejected {
    /// Creates a rejection for a value of `size` against `limit`.
    #[must_use]
    pub const fn new(size: usize, limit: usize) -> Self {
        Self { size, limit }
    }
}

/// Errors raised while building a wrapper or loading its configuration.
#[derive(Debug, Error)]
pub enum MemoError {
    /// A thread-shared wrapper was given a cache but no exclusion kind.
    #[error("shared memo wrapper `{name}` needs an exclusion kind to guard its cache")]
    Unsynchronized {
        /// Name of the wrapper being built
        name: String,
    },

    /// The configuration document could not be parsed.
    #[cfg(feature = "config")]
    #[error("invalid memo configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl MemoError {
    /// Creates a [`MemoError::Unsynchronized`] for the named wrapper.
    pub fn unsynchronized(name: impl Into<String>) -> Self {
        Self::Unsynchronized { name: name.into() }
    }
}
