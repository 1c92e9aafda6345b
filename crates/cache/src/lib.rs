//! Read-through / write-through cache in front of the session list and chat
//! history stores.
//!
//! - [`store`] -- the [`CacheStore`] backend trait.
//! - [`redis_store`] -- Redis backend over a multiplexed async connection.
//! - [`memory`] -- in-process backend used without Redis and in tests.
//! - [`keys`] -- cache key scheme.
//! - [`chat`] -- [`ChatCache`], the read and update policy.

pub mod chat;
pub mod config;
pub mod error;
pub mod keys;
pub mod memory;
pub mod redis_store;
pub mod store;

use std::sync::Arc;

pub use chat::ChatCache;
pub use config::CacheConfig;
pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis_store::RedisCache;
pub use store::CacheStore;

/// Open the backend selected by `config`.
///
/// Connects to Redis when `REDIS_URL` is configured, otherwise falls back to
/// an in-process [`MemoryCache`].
pub async fn connect_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisCache::connect(url).await?;
            tracing::info!("Connected to Redis cache");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-process cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}
