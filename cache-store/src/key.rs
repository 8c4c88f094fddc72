use base64::Engine;
use serde::Serialize;
use std::collections::BTreeMap;

/// Deterministic request signature. Two logically identical requests always
/// produce the same key; the rendering is order-stable because headers are
/// kept in a `BTreeMap` and serialized in sorted order.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyParts<'a> {
    method: &'a str,
    endpoint: &'a str,
    headers: &'a BTreeMap<String, String>,
    body: Option<String>,
}

impl CacheKey {
    /// Derive a key from the identity-relevant parts of a request.
    pub fn derive(
        method: &str,
        endpoint: &str,
        headers: &BTreeMap<String, String>,
        body: Option<&[u8]>,
    ) -> Self {
        let parts = KeyParts {
            method,
            endpoint,
            headers,
            body: body.map(|b| base64::engine::general_purpose::STANDARD.encode(b)),
        };
        // String-keyed struct with no non-finite numbers, cannot fail.
        let rendered =
            serde_json::to_string(&parts).expect("cache key parts always serialize");
        Self(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
