//! Cache-or-coalesce-or-fetch decision point. Owns every entry lifecycle
//! transition in the [`ResponseStore`]; callers above it only supply a key,
//! a policy, and a way to perform the underlying call.

pub mod policy;

pub use policy::{FetchPolicy, PolicyOverrides};

use bytes::Bytes;
use cache_store::{CacheKey, ResponseStore, SharedAttempt};
use futures::FutureExt;
use futures::future::BoxFuture;
use shared::Result;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Decides, per call, whether to return stored data, join an outstanding
/// attempt, or start a new one. One instance per application root; every
/// caller shares it (and the store it owns) through an `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<ResponseStore>,
}

impl Orchestrator {
    pub fn new(store: Arc<ResponseStore>) -> Self {
        Self { store }
    }

    /// The underlying table, for manual invalidation.
    pub fn store(&self) -> &Arc<ResponseStore> {
        &self.store
    }

    /// Resolve one request.
    ///
    /// Decision ladder:
    /// 1. `policy.cache == false`: perform a direct call, never touch the store.
    /// 2. Fresh entry: return the stored payload, zero transport calls.
    /// 3. `policy.dedupe` and an attempt is outstanding: join it.
    /// 4. Otherwise start a new attempt and record it while it runs.
    ///
    /// Settlement is part of the shared attempt itself: on success the store
    /// is refreshed (timestamped at resolution), on failure the entry is
    /// evicted so the next call is a genuine miss. Failures are not retried
    /// here and are handed unchanged to every joiner of that attempt.
    ///
    /// Known limitation: a call that never settles leaves its key in-flight
    /// until some joiner drives it to completion; no timeout is imposed at
    /// this layer.
    pub async fn resolve<F>(&self, key: CacheKey, policy: &FetchPolicy, perform: F) -> Result<Bytes>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Bytes>>,
    {
        if !policy.cache {
            debug!(key = key.as_str(), "cache bypass");
            return perform().await;
        }

        let now = Instant::now();
        if let Some(entry) = self.store.get(&key) {
            // A fresh payload short-circuits everything, including any
            // outstanding attempt for the same key.
            if let Some(data) = entry.fresh_data(policy.ttl, now) {
                debug!(key = key.as_str(), "cache hit");
                return Ok(data);
            }
            if policy.dedupe {
                if let Some(attempt) = entry.in_flight {
                    debug!(key = key.as_str(), "joining outstanding attempt");
                    return attempt.await;
                }
            }
        }

        debug!(
            key = key.as_str(),
            dedupe = policy.dedupe,
            "cache miss, starting attempt"
        );
        let store = Arc::clone(&self.store);
        let settle_key = key.clone();
        let fut = perform();
        let attempt: SharedAttempt = async move {
            match fut.await {
                Ok(data) => {
                    store.put(settle_key, data.clone(), Instant::now());
                    Ok(data)
                }
                Err(err) => {
                    warn!(key = settle_key.as_str(), error = %err, "attempt failed, evicting");
                    store.evict(&settle_key);
                    Err(err)
                }
            }
        }
        .boxed()
        .shared();

        if policy.dedupe {
            self.store.put_in_flight(key, attempt.clone());
        }
        attempt.await
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .finish()
    }
}
