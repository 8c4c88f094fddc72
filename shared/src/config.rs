use tracing::warn;

/// Process-level defaults for the cache layer. Per-call policy overrides
/// always win over these.
pub struct Config {
    pub base_url: String,
    pub default_ttl_ms: u64,
    pub dedupe: bool,
    pub cache: bool,
}

impl Config {
    const DEFAULT_TTL_MS: u64 = 60_000;

    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RECALL_BASE_URL").unwrap_or_else(|_| {
                warn!("RECALL_BASE_URL not set, endpoints are used verbatim");
                String::new()
            }),
            default_ttl_ms: std::env::var("RECALL_DEFAULT_TTL_MS")
                .unwrap_or_else(|_| Self::DEFAULT_TTL_MS.to_string())
                .parse::<u64>()
                .unwrap_or(Self::DEFAULT_TTL_MS),
            dedupe: env_flag("RECALL_DEDUPE", true),
            cache: env_flag("RECALL_CACHE", true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_ttl_ms: Self::DEFAULT_TTL_MS,
            dedupe: true,
            cache: true,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => !(v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("off")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_defaults_when_unset() {
        assert!(env_flag("RECALL_TEST_FLAG_UNSET", true));
        assert!(!env_flag("RECALL_TEST_FLAG_UNSET", false));
    }

    #[test]
    fn flag_parses_off_values() {
        unsafe {
            std::env::set_var("RECALL_TEST_FLAG_OFF", "false");
        }
        assert!(!env_flag("RECALL_TEST_FLAG_OFF", true));
        unsafe {
            std::env::set_var("RECALL_TEST_FLAG_OFF", "0");
        }
        assert!(!env_flag("RECALL_TEST_FLAG_OFF", true));
        unsafe {
            std::env::set_var("RECALL_TEST_FLAG_OFF", "1");
        }
        assert!(env_flag("RECALL_TEST_FLAG_OFF", false));
    }
}
