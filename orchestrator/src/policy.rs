use shared::TtlMs;
use shared::config::Config;

/// Per-call cache policy. The store never records policy; whatever flags the
/// calling request carries are the ones honored, even when callers of the
/// same key disagree.
#[derive(Clone, Copy, Debug)]
pub struct FetchPolicy {
    /// Freshness window for stored payloads.
    pub ttl: TtlMs,
    /// Join an already-outstanding attempt for the same key instead of
    /// starting a new one.
    pub dedupe: bool,
    /// When false, bypass the store entirely and perform a direct call.
    pub cache: bool,
}

impl FetchPolicy {
    pub const DEFAULT_TTL_MS: u64 = 60_000;

    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: TtlMs(config.default_ttl_ms),
            dedupe: config.dedupe,
            cache: config.cache,
        }
    }

    pub fn ttl(mut self, ttl: TtlMs) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            ttl: TtlMs(Self::DEFAULT_TTL_MS),
            dedupe: true,
            cache: true,
        }
    }
}

/// Optional per-call overrides layered on top of an adapter's defaults.
/// Unset fields fall through to the base policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyOverrides {
    pub ttl: Option<TtlMs>,
    pub dedupe: Option<bool>,
    pub cache: Option<bool>,
}

impl PolicyOverrides {
    pub fn apply(self, base: FetchPolicy) -> FetchPolicy {
        FetchPolicy {
            ttl: self.ttl.unwrap_or(base.ttl),
            dedupe: self.dedupe.unwrap_or(base.dedupe),
            cache: self.cache.unwrap_or(base.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_fall_through_to_base() {
        let base = FetchPolicy::default().dedupe(false);
        let merged = PolicyOverrides {
            ttl: Some(TtlMs(5)),
            ..Default::default()
        }
        .apply(base);

        assert_eq!(merged.ttl.0, 5);
        assert!(!merged.dedupe);
        assert!(merged.cache);
    }

    #[test]
    fn policy_from_config_defaults() {
        let policy = FetchPolicy::from_config(&Config::default());
        assert_eq!(policy.ttl.0, FetchPolicy::DEFAULT_TTL_MS);
        assert!(policy.dedupe);
        assert!(policy.cache);
    }
}
