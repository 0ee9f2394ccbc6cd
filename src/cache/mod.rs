//! Result Cache Module
//!
//! A best-effort TTL cache shared by both services, used in two independent keyspaces:
//! - **Compute side** (`analyze:*`): content-addressed memoization of analysis results,
//!   keyed by a hash of the input text.
//! - **Intake side** (`receiver:*`): read-through snapshots of requests, keyed by id.
//!
//! Losing an entry in either keyspace only costs a recomputation or a store read.
//! Nothing here owns data, so backend failures are logged and degrade to a miss.
//!
//! ## Submodules
//! - **`memory`**: In-process `DashMap` backend with lazy expiry.
//! - **`redis`**: Redis backend over a lazily established `ConnectionManager`.
//! - **`result_cache`**: Typed, namespaced wrapper that swallows backend errors.
//! - **`keys`**: Key derivation for both keyspaces.

pub mod keys;
pub mod memory;
pub mod redis;
pub mod result_cache;

pub use memory::MemoryCache;
pub use redis::RedisCache;
pub use result_cache::ResultCache;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),

    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Raw string key-value operations offered by a cache provider.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;
}

/// Builds a backend from a `CACHE_ADDR` value.
///
/// `memory://` selects the in-process backend; anything else is treated as a
/// Redis address, with or without the `redis://` scheme.
pub fn backend_from_addr(addr: &str) -> CacheResult<Arc<dyn CacheBackend>> {
    if addr.starts_with("memory://") {
        tracing::warn!("Using in-process cache backend; entries are not shared between services");
        return Ok(Arc::new(MemoryCache::new()));
    }

    Ok(Arc::new(RedisCache::new(addr)?))
}

#[cfg(test)]
mod tests;
