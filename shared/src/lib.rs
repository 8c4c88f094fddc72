// shared/src/lib.rs

use std::time::Duration;

/// Errors surfaced by the cache layer. `Clone` so a single failed attempt
/// can be fanned out to every coalesced joiner.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("transport: {0}")]
    Transport(String),
    #[error("upstream status {0}")]
    Status(u16),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug)]
pub struct TtlMs(pub u64);

impl TtlMs {
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

pub mod config;
