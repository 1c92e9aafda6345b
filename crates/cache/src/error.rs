/// Failures of the cache backend or of (de)serializing cached snapshots.
///
/// These never reach an HTTP response; the cache layer logs them and falls
/// back to the authoritative store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
