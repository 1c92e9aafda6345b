use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Minimal string key/value backend with per-key expiry.
///
/// Mirrors the subset of Redis commands the cache policy needs. Lifetimes
/// are kept at millisecond precision so that rewriting an entry never
/// extends it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl` (at least one millisecond).
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Overwrite the value of a live key, keeping its current expiry.
    ///
    /// Returns `false` and writes nothing when the key is absent or expired.
    async fn replace(&self, key: &str, value: &str) -> Result<bool, CacheError>;

    /// Remaining lifetime, `None` when the key is absent or has no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), CacheError>;
}
