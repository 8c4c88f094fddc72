use crate::request::RequestOptions;
use crate::transport::Transport;
use bytes::Bytes;
use futures::FutureExt;
use orchestrator::{FetchPolicy, Orchestrator, PolicyOverrides};
use shared::config::Config;
use shared::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One logical calling site. Each instance owns exactly one cancellation
/// lifecycle: issuing a new call through it cancels the previous call made
/// through the same instance, and nothing else — other instances and other
/// joiners of a coalesced attempt are unaffected.
///
/// `loading` and `error` are observable through `watch` channels for UI
/// binding; only the newest call through an instance may report state.
pub struct ApiClient {
    orchestrator: Arc<Orchestrator>,
    transport: Arc<dyn Transport>,
    base_url: String,
    policy: FetchPolicy,
    bearer: Mutex<Option<String>>,
    current_call: Mutex<Option<CancellationToken>>,
    call_seq: AtomicU64,
    loading_tx: watch::Sender<bool>,
    error_tx: watch::Sender<Option<Error>>,
}

impl ApiClient {
    pub fn new(orchestrator: Arc<Orchestrator>, transport: Arc<dyn Transport>) -> Self {
        let (loading_tx, _) = watch::channel(false);
        let (error_tx, _) = watch::channel(None);
        Self {
            orchestrator,
            transport,
            base_url: String::new(),
            policy: FetchPolicy::default(),
            bearer: Mutex::new(None),
            current_call: Mutex::new(None),
            call_seq: AtomicU64::new(0),
            loading_tx,
            error_tx,
        }
    }

    /// Construct with base URL and default policy taken from process config.
    pub fn from_config(
        config: &Config,
        orchestrator: Arc<Orchestrator>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::new(orchestrator, transport)
            .with_base_url(config.base_url.clone())
            .with_policy(FetchPolicy::from_config(config))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-instance default policy; `invoke`'s overrides win over this.
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Supply the opaque credential forwarded as a bearer header. Storage of
    /// the credential itself is the caller's concern.
    pub fn set_bearer(&self, token: impl Into<String>) {
        *lock(&self.bearer) = Some(token.into());
    }

    pub fn clear_bearer(&self) {
        *lock(&self.bearer) = None;
    }

    /// Perform one call. Returns `Ok(None)` only when this call was
    /// cancelled — by a newer call through this instance or by [`cancel`] —
    /// in which case `error` is left untouched and any coalesced attempt
    /// keeps running for its other joiners.
    ///
    /// [`cancel`]: ApiClient::cancel
    pub async fn invoke(
        &self,
        endpoint: &str,
        options: RequestOptions,
        overrides: Option<PolicyOverrides>,
    ) -> Result<Option<Bytes>> {
        // A new call through this instance supersedes the previous one.
        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.current_call).replace(token.clone()) {
            previous.cancel();
        }
        let call_id = self.call_seq.fetch_add(1, Ordering::SeqCst) + 1;

        self.loading_tx.send_replace(true);
        self.error_tx.send_replace(None);

        let policy = overrides.map_or(self.policy, |o| o.apply(self.policy));
        let merged = options.merged_with_defaults(lock(&self.bearer).as_deref());
        let url = format!("{}{}", self.base_url, endpoint);
        let key = merged.cache_key(&url);

        let transport = Arc::clone(&self.transport);
        let perform = move || {
            async move { transport.call(&url, &merged).await }.boxed()
        };

        let outcome = tokio::select! {
            _ = token.cancelled() => None,
            result = self.orchestrator.resolve(key, &policy, perform) => Some(result),
        };

        // Guaranteed cleanup, but only while this is still the newest call:
        // a superseded call has lost its right to report state.
        let active = self.call_seq.load(Ordering::SeqCst) == call_id;
        if active {
            self.loading_tx.send_replace(false);
        }

        match outcome {
            None => {
                debug!(endpoint, "call cancelled");
                Ok(None)
            }
            Some(Ok(data)) => Ok(Some(data)),
            Some(Err(err)) => {
                if active {
                    self.error_tx.send_replace(Some(err.clone()));
                }
                Err(err)
            }
        }
    }

    /// Cancel whatever call is currently pending on this instance.
    pub fn cancel(&self) {
        if let Some(token) = lock(&self.current_call).take() {
            token.cancel();
        }
    }

    /// Fresh-only synchronous read of the cached payload for a request,
    /// without touching loading/error state or the transport.
    pub fn peek(&self, endpoint: &str, options: &RequestOptions) -> Option<Bytes> {
        let key = self.signature(endpoint, options);
        self.orchestrator.store().peek(&key, self.policy.ttl)
    }

    /// Manually invalidate one cached request, e.g. after a mutating action.
    pub fn evict(&self, endpoint: &str, options: &RequestOptions) -> bool {
        let key = self.signature(endpoint, options);
        self.orchestrator.store().evict(&key)
    }

    /// Drop every cached entry in the shared store. Global: affects all
    /// instances sharing the orchestrator.
    pub fn clear_all(&self) {
        self.orchestrator.store().clear();
    }

    pub fn loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    pub fn error(&self) -> Option<Error> {
        self.error_tx.borrow().clone()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<Error>> {
        self.error_tx.subscribe()
    }

    fn signature(&self, endpoint: &str, options: &RequestOptions) -> cache_store::CacheKey {
        let merged = options.merged_with_defaults(lock(&self.bearer).as_deref());
        merged.cache_key(&format!("{}{}", self.base_url, endpoint))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .field("loading", &self.loading())
            .finish()
    }
}

// Lock helper: none of the guarded sections can panic, so a poisoned lock
// only ever carries consistent state.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
