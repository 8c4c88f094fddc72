use crate::request::RequestOptions;
use async_trait::async_trait;
use bytes::Bytes;
use shared::Result;

/// Port for the byte-moving call itself. This workspace ships no HTTP
/// implementation; the application supplies one (and with it any retry,
/// timeout, or status-mapping behavior it wants below this layer).
///
/// Implementations should surface non-success responses as
/// [`shared::Error::Status`] and connection faults as
/// [`shared::Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn call(&self, url: &str, options: &RequestOptions) -> Result<Bytes>;
}
