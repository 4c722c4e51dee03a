//! The cache contract consumed by memoizing wrappers.
//!
//! memokit does not implement eviction, expiry or capacity accounting. A
//! wrapper only needs a store that can answer three questions: is a value
//! present for this key, will you keep this value, and can you forget
//! everything. [`Cache`] captures exactly that.
//!
//! # Examples
//!
//! Any `HashMap` is an unbounded cache that never rejects:
//!
//! ```
//! use std::collections::HashMap;
//!
//! use memokit::cache::Cache;
//!
//! let mut cache: HashMap<u32, String> = HashMap::new();
//! assert_eq!(cache.lookup(&1), None);
//! Cache::insert(&mut cache, 1, "one".to_string()).unwrap();
//! assert_eq!(cache.lookup(&1), Some("one".to_string()));
//! ```

mod contract;

pub use contract::Cache;
