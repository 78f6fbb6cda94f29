//! Pluggable TTL cache behind a single async contract.
//!
//! Two providers with identical externally observed semantics:
//! [`MemoryCache`] (process-local DashMap, no serialization) and
//! [`SharedCache`] (Redis, JSON payloads). The provider is chosen once
//! at startup by [`build_cache`]; callers never branch on it again.
//!
//! Provider failures are logged and surface as a miss or no-op. A broken
//! cache costs latency, never correctness.

mod memory;
mod shared;

pub use memory::MemoryCache;
pub use shared::SharedCache;

use crate::config::{CacheProvider, Config};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Shared provider selected without a connection endpoint. Fatal at
    /// startup.
    #[error("shared cache selected but no endpoint configured")]
    MissingEndpoint,
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

/// TTL key/value contract, generic over the stored value type.
#[async_trait]
pub trait ZoneCache<T>: Send + Sync {
    /// None on miss or on an already-expired entry; reading an expired
    /// entry evicts it.
    async fn get(&self, key: &str) -> Option<T>;

    /// Store a value. No ttl means the entry never expires.
    async fn set(&self, key: &str, value: T, ttl: Option<Duration>);

    /// Remove a key; false if it was not present.
    async fn delete(&self, key: &str) -> bool;

    /// Drop every entry owned by this cache.
    async fn clear(&self);
}

/// Construct the configured provider. This is the only place provider
/// selection happens; everything downstream holds the trait object.
pub async fn build_cache<T>(config: &Config) -> Result<Arc<dyn ZoneCache<T>>, CacheError>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    match config.cache_provider {
        CacheProvider::Memory => {
            tracing::info!("using in-memory cache provider");
            Ok(Arc::new(MemoryCache::new()))
        }
        CacheProvider::Shared => {
            let url = config
                .cache_url
                .as_deref()
                .ok_or(CacheError::MissingEndpoint)?;
            let cache = SharedCache::connect(url).await?;
            tracing::info!("connected to shared cache provider");
            Ok(Arc::new(cache))
        }
    }
}
