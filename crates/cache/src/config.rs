use std::time::Duration;

/// Default lifetime of the `sessions_list:{user}` entry (15 minutes).
const DEFAULT_SESSIONS_TTL_SECS: u64 = 900;
/// Default lifetime of the `session_messages:{user}:{session}` entry (15 minutes).
const DEFAULT_MESSAGES_TTL_SECS: u64 = 900;

/// Cache backend selection and entry lifetimes.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL. `None` selects the in-process backend.
    pub redis_url: Option<String>,
    /// Lifetime of a freshly populated session list, in seconds.
    pub sessions_ttl_secs: u64,
    /// Lifetime of a freshly populated message list, in seconds.
    pub messages_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            sessions_ttl_secs: DEFAULT_SESSIONS_TTL_SECS,
            messages_ttl_secs: DEFAULT_MESSAGES_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Lifetime of a freshly populated session list.
    pub fn sessions_ttl(&self) -> Duration {
        Duration::from_secs(self.sessions_ttl_secs)
    }

    /// Lifetime of a freshly populated message list.
    pub fn messages_ttl(&self) -> Duration {
        Duration::from_secs(self.messages_ttl_secs)
    }

    /// Load cache configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `REDIS_URL`               | no       | --      |
    /// | `CACHE_SESSIONS_TTL_SECS` | no       | `900`   |
    /// | `CACHE_MESSAGES_TTL_SECS` | no       | `900`   |
    ///
    /// # Panics
    ///
    /// Panics if a TTL is not a positive integer.
    pub fn from_env() -> Self {
        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let sessions_ttl_secs = ttl_from_env("CACHE_SESSIONS_TTL_SECS", DEFAULT_SESSIONS_TTL_SECS);
        let messages_ttl_secs = ttl_from_env("CACHE_MESSAGES_TTL_SECS", DEFAULT_MESSAGES_TTL_SECS);

        Self {
            redis_url,
            sessions_ttl_secs,
            messages_ttl_secs,
        }
    }
}

fn ttl_from_env(var: &str, default: u64) -> u64 {
    let secs: u64 = std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{var} must be a valid u64"));
    assert!(secs > 0, "{var} must be greater than zero");
    secs
}
