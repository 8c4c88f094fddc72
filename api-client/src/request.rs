use bytes::Bytes;
use cache_store::CacheKey;
use serde::Serialize;
use shared::{Error, Result};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Request options bag passed through to the transport verbatim, except for
/// the header merge performed by the adapter. Headers live in a `BTreeMap`
/// so the derived cache key is order-stable by construction.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    /// Deliberate cache-key override: requests carrying the same override
    /// share one entry regardless of their derived signature.
    pub cache_key: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    /// Add a header. Names are lowercased so caller overrides reliably
    /// shadow adapter defaults.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Override the derived cache key for this request.
    pub fn cache_key_override(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let rendered =
            serde_json::to_vec(body).map_err(|e| Error::Internal(format!("json body: {e}")))?;
        self.body = Some(Bytes::from(rendered));
        Ok(self)
    }

    /// Merge adapter defaults under the caller's headers. Explicit caller
    /// headers win over both the content type and the injected credential.
    pub(crate) fn merged_with_defaults(&self, bearer: Option<&str>) -> RequestOptions {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        if let Some(token) = bearer {
            headers.insert("authorization".to_string(), format!("Bearer {token}"));
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        RequestOptions {
            method: self.method,
            headers,
            body: self.body.clone(),
            cache_key: self.cache_key.clone(),
        }
    }

    /// Request signature for the store, derived from the merged options so
    /// anything that affects the response (method, headers, body) is part
    /// of the key — unless the caller supplied a deliberate override.
    pub(crate) fn cache_key(&self, url: &str) -> CacheKey {
        match &self.cache_key {
            Some(key) => CacheKey::from(key.clone()),
            None => {
                CacheKey::derive(self.method.as_str(), url, &self.headers, self.body.as_deref())
            }
        }
    }
}
