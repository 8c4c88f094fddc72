use bytes::Bytes;
use futures::future::{BoxFuture, Shared};
use shared::{Result, TtlMs};
use std::fmt::Debug;
use tokio::time::Instant;

/// A not-yet-settled attempt for one key, joinable by every coalesced caller.
/// Whichever joiner drives it to completion performs the store transition.
pub type SharedAttempt = Shared<BoxFuture<'static, Result<Bytes>>>;

/// Last known state for one request signature. `data` is `None` only while
/// the first attempt for the key is still outstanding.
#[derive(Clone)]
pub struct CacheEntry {
    pub data: Option<Bytes>,
    pub timestamp: Instant,
    pub in_flight: Option<SharedAttempt>,
}

impl CacheEntry {
    /// The stored payload, if present and still fresh at `now`. Staleness is
    /// evaluated lazily here; a stale entry stays in the table until refreshed
    /// or evicted.
    pub fn fresh_data(&self, ttl: TtlMs, now: Instant) -> Option<Bytes> {
        match &self.data {
            Some(data) if now.duration_since(self.timestamp) < ttl.as_duration() => {
                Some(data.clone())
            }
            _ => None,
        }
    }
}

impl Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("data_len", &self.data.as_ref().map(Bytes::len))
            .field("timestamp", &self.timestamp)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}
