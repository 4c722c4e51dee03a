//! Wrapper configuration types and builder patterns
//!
//! A [`MemoConfig`] fixes, for the lifetime of a wrapper, which exclusion
//! discipline guards the cache and whether hit/miss statistics are kept.
//! Together with the presence or absence of a cache it decides the
//! [`MemoStrategy`](super::MemoStrategy).

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::error::MemoResult;

/// Exclusion discipline guarding a shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum ExclusionKind {
    /// A mutex around every cache access. Concurrent misses on the same key
    /// may compute the value more than once; the first stored value wins.
    Plain,
    /// A mutex plus a condition variable. At most one caller computes a given
    /// missing key at a time; others wait for it and then re-check the cache.
    Condition,
}

/// Configuration for wrapper behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct MemoConfig {
    /// Name reported in log events and errors (None = anonymous)
    pub name: Option<String>,

    /// Exclusion discipline for the cache (None = no locking)
    pub exclusion: Option<ExclusionKind>,

    /// Whether to count hits and misses
    pub track_stats: bool,
}

impl MemoConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> MemoConfigBuilder {
        MemoConfigBuilder::default()
    }

    /// Preset for a single-threaded wrapper without locking
    ///
    /// # Example
    /// ```
    /// use memokit::MemoConfig;
    ///
    /// let config = MemoConfig::unlocked();
    /// assert!(config.exclusion.is_none());
    /// ```
    #[must_use]
    pub fn unlocked() -> Self {
        Self::default()
    }

    /// Preset for a mutex-guarded wrapper
    ///
    /// # Example
    /// ```
    /// use memokit::{ExclusionKind, MemoConfig};
    ///
    /// let config = MemoConfig::locked();
    /// assert_eq!(config.exclusion, Some(ExclusionKind::Plain));
    /// ```
    #[must_use]
    pub fn locked() -> Self {
        Self { exclusion: Some(ExclusionKind::Plain), ..Self::default() }
    }

    /// Preset for a condition-gated wrapper that de-duplicates concurrent
    /// misses. Statistics are enabled since the condition-gated strategy
    /// always tracks them.
    ///
    /// # Example
    /// ```
    /// use memokit::{ExclusionKind, MemoConfig};
    ///
    /// let config = MemoConfig::deduplicated();
    /// assert_eq!(config.exclusion, Some(ExclusionKind::Condition));
    /// assert!(config.track_stats);
    /// ```
    #[must_use]
    pub fn deduplicated() -> Self {
        Self { exclusion: Some(ExclusionKind::Condition), track_stats: true, ..Self::default() }
    }

    /// Parse a configuration from a TOML document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use memokit::{ExclusionKind, MemoConfig};
    ///
    /// let config = MemoConfig::from_toml_str(
    ///     r#"
    ///     name = "geocode"
    ///     exclusion = "condition"
    ///     track_stats = true
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.exclusion, Some(ExclusionKind::Condition));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::Config`](crate::MemoError::Config) when the
    /// document is not valid TOML or names an unknown field or exclusion kind.
    #[cfg(feature = "config")]
    pub fn from_toml_str(document: &str) -> MemoResult<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Name used in log events, falling back to `"anonymous"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }
}

/// Builder for `MemoConfig` with fluent API
#[derive(Debug, Default)]
pub struct MemoConfigBuilder {
    config: MemoConfig,
}

impl MemoConfigBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wrapper name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set the exclusion discipline
    #[must_use]
    pub fn exclusion(mut self, kind: ExclusionKind) -> Self {
        self.config.exclusion = Some(kind);
        self
    }

    /// Enable or disable hit/miss tracking
    #[must_use]
    pub fn track_stats(mut self, enabled: bool) -> Self {
        self.config.track_stats = enabled;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> MemoConfig {
        self.config
    }
}
