//! Testing utilities and helpers
//!
//! Available to the crate's own tests and, with the `test-utils` feature, to
//! downstream test suites.
//!
//! - **[`mocks`]**: cache doubles for exercising capacity rejection and
//!   invocation counters for the wrapped function.

pub mod mocks;

pub use mocks::{CallCounter, CappedCache, RejectingCache};
