use std::time::Duration;

/// Environment variable name for overriding the range API base URL.
pub const HIBP_API_URL_ENV: &str = "HIBP_API_URL";

/// Environment variable name for overriding the User-Agent header.
pub const HIBP_USER_AGENT_ENV: &str = "HIBP_USER_AGENT";

pub const DEFAULT_BASE_URL: &str = "https://api.pwnedpasswords.com";

/// The range API rejects requests without a User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("hibp-range/", env!("CARGO_PKG_VERSION"));

/// How long a cached verdict stays valid (2 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Settings for a [`RangeClient`](crate::RangeClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl ClientConfig {
    /// Builds a config from the HIBP_API_URL and HIBP_USER_AGENT environment
    /// variables, falling back to the defaults for anything unset or empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: var(HIBP_API_URL_ENV).unwrap_or(defaults.base_url),
            user_agent: var(HIBP_USER_AGENT_ENV).unwrap_or(defaults.user_agent),
            cache_ttl: defaults.cache_ttl,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }
}
