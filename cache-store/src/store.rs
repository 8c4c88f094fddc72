use crate::entry::{CacheEntry, SharedAttempt};
use crate::key::CacheKey;
use bytes::Bytes;
use dashmap::DashMap;
use shared::TtlMs;
use std::fmt::Debug;
use tokio::time::Instant;

/// Process-wide response table, shared by every caller through an `Arc`.
/// Explicitly constructed and injected rather than module-global so tests
/// and multiple application roots get isolated instances.
///
/// All operations are synchronous and atomic per key; no operation performs
/// I/O or evaluates freshness policy beyond storing a timestamp.
#[derive(Default)]
pub struct ResponseStore {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Read the entry for a key. No side effects.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Record a successful payload. Replaces the whole entry, which also
    /// clears any in-flight handle in the same atomic insert.
    pub fn put(&self, key: CacheKey, data: Bytes, timestamp: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                data: Some(data),
                timestamp,
                in_flight: None,
            },
        );
    }

    /// Record the shared handle for an outstanding attempt. Last writer wins;
    /// any payload already stored for the key is preserved.
    pub fn put_in_flight(&self, key: CacheKey, handle: SharedAttempt) {
        let mut entry = self.entries.entry(key).or_insert_with(|| CacheEntry {
            data: None,
            timestamp: Instant::now(),
            in_flight: None,
        });
        entry.in_flight = Some(handle);
    }

    /// Remove the entry if present. Returns whether it existed.
    pub fn evict(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Fresh-only synchronous read. Stale entries are left in place.
    pub fn peek(&self, key: &CacheKey, ttl: TtlMs) -> Option<Bytes> {
        self.get(key)
            .and_then(|entry| entry.fresh_data(ttl, Instant::now()))
    }
}

impl Debug for ResponseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStore")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}
