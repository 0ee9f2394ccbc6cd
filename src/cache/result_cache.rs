use super::CacheBackend;
use super::keys::namespaced;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Typed view over one keyspace of a `CacheBackend`.
///
/// Every operation is best-effort: a backend or (de)serialization failure is
/// logged and reported to the caller as a miss (`get`) or silently dropped
/// (`set`, `invalidate`).
pub struct ResultCache<V> {
    backend: Arc<dyn CacheBackend>,
    namespace: &'static str,
    ttl: Duration,
    _value: PhantomData<fn() -> V>,
}

impl<V> ResultCache<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn CacheBackend>, namespace: &'static str, ttl: Duration) -> Self {
        Self {
            backend,
            namespace,
            ttl,
            _value: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let full_key = namespaced(self.namespace, key);

        let raw = match self.backend.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "Cache get failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "Failed to deserialize cached value");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &V) {
        let full_key = namespaced(self.namespace, key);

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(key = %full_key, error = %e, "Failed to serialize cache value");
                return;
            }
        };

        if let Err(e) = self.backend.set(&full_key, &raw, self.ttl).await {
            tracing::error!(key = %full_key, error = %e, "Cache set failed");
        }
    }

    pub async fn invalidate(&self, key: &str) {
        let full_key = namespaced(self.namespace, key);
        if let Err(e) = self.backend.delete(&full_key).await {
            tracing::warn!(key = %full_key, error = %e, "Cache delete failed");
        }
    }

    /// Backend reachability, as reported by the health endpoints.
    pub async fn is_healthy(&self) -> bool {
        match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::error!(
                    provider = self.backend.provider_name(),
                    error = %e,
                    "Cache health check failed"
                );
                false
            }
        }
    }
}
