//! Keyed response table: last known payload per request signature plus a
//! transient handle to any in-flight attempt. Pure data and accessors; the
//! freshness and coalescing policy lives in the `orchestrator` crate.

pub mod entry;
pub mod key;
pub mod store;

pub use entry::{CacheEntry, SharedAttempt};
pub use key::CacheKey;
pub use store::ResponseStore;
