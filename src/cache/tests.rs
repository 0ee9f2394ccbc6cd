//! Cache Module Tests
//!
//! ## Test Scopes
//! - **Backend**: TTL round-trip and expiry of the in-memory provider.
//! - **ResultCache**: Namespacing, typed values, and best-effort error handling.
//! - **Keys**: FNV-1a reference values and namespace prefixes.
//!
//! *Note: The Redis provider needs a live server and is exercised in deployment, not here.*

#[cfg(test)]
mod tests {
    use crate::cache::keys::{
        ANALYSIS_NAMESPACE, REQUEST_NAMESPACE, fnv1a_32, namespaced, request_key, text_key,
    };
    use crate::cache::{
        CacheBackend, CacheError, CacheResult, MemoryCache, ResultCache, backend_from_addr,
    };
    use crate::store::RequestId;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    fn payload() -> Payload {
        Payload {
            name: "cached".to_string(),
            count: 7,
        }
    }

    /// Backend that fails every operation.
    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Connection("refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Timeout("SETEX".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Backend("DEL".to_string()))
        }

        async fn health_check(&self) -> CacheResult<bool> {
            Err(CacheError::Connection("refused".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    // ============================================================
    // MEMORY BACKEND
    // ============================================================

    #[tokio::test]
    async fn test_memory_round_trip_within_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_memory_entry_expires_after_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("k", "v", Duration::from_millis(30))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty(), "expired entry is evicted on read");
    }

    #[tokio::test]
    async fn test_memory_overwrite_and_delete() {
        let cache = MemoryCache::new();

        cache.set("k", "1", Duration::from_secs(60)).await.unwrap();
        cache.set("k", "2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("2".to_string()));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_unrepresentable_ttl_never_expires() {
        let cache = MemoryCache::new();

        cache
            .set("k", "v", Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_result_cache_write_with_huge_ttl_succeeds() {
        let cache: ResultCache<Payload> = ResultCache::new(
            Arc::new(MemoryCache::new()),
            "test",
            Duration::from_secs(u64::MAX),
        );

        cache.set("a", &payload()).await;

        assert_eq!(cache.get("a").await, Some(payload()));
    }

    #[tokio::test]
    async fn test_backend_from_addr_selects_memory() {
        let backend = backend_from_addr("memory://").unwrap();
        assert_eq!(backend.provider_name(), "memory");

        let backend = backend_from_addr("localhost:6379").unwrap();
        assert_eq!(backend.provider_name(), "redis");
    }

    // ============================================================
    // RESULT CACHE
    // ============================================================

    #[tokio::test]
    async fn test_result_cache_round_trip() {
        let cache: ResultCache<Payload> =
            ResultCache::new(Arc::new(MemoryCache::new()), "test", Duration::from_secs(60));

        assert_eq!(cache.get("a").await, None);

        cache.set("a", &payload()).await;

        assert_eq!(cache.get("a").await, Some(payload()));
    }

    #[tokio::test]
    async fn test_result_cache_expires() {
        let cache: ResultCache<Payload> =
            ResultCache::new(Arc::new(MemoryCache::new()), "test", Duration::from_millis(30));

        cache.set("a", &payload()).await;
        assert!(cache.get("a").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let backend: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new());
        let first: ResultCache<Payload> =
            ResultCache::new(backend.clone(), ANALYSIS_NAMESPACE, Duration::from_secs(60));
        let second: ResultCache<Payload> =
            ResultCache::new(backend.clone(), REQUEST_NAMESPACE, Duration::from_secs(60));

        first.set("same", &payload()).await;

        assert!(first.get("same").await.is_some());
        assert!(second.get("same").await.is_none());
        assert!(backend.get("analyze:same").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache: ResultCache<Payload> =
            ResultCache::new(Arc::new(MemoryCache::new()), "test", Duration::from_secs(60));

        cache.set("a", &payload()).await;
        cache.invalidate("a").await;

        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_value_is_a_miss() {
        let backend: Arc<dyn CacheBackend> = Arc::new(MemoryCache::new());
        backend
            .set("test:a", "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let cache: ResultCache<Payload> =
            ResultCache::new(backend, "test", Duration::from_secs(60));

        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_backend_failures_are_swallowed() {
        let cache: ResultCache<Payload> =
            ResultCache::new(Arc::new(BrokenBackend), "test", Duration::from_secs(60));

        // None of these may panic or propagate
        cache.set("a", &payload()).await;
        cache.invalidate("a").await;

        assert!(cache.get("a").await.is_none());
        assert!(!cache.is_healthy().await);
    }

    // ============================================================
    // KEYS
    // ============================================================

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_text_key_is_stable_and_decimal() {
        let key = text_key("Hello, how are you?");

        assert_eq!(key, text_key("Hello, how are you?"));
        assert!(key.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(key, text_key("Hello, how are you!"));
        assert_eq!(
            namespaced(ANALYSIS_NAMESPACE, &key),
            format!("analyze:{}", key)
        );
    }

    #[test]
    fn test_request_key_uses_uuid() {
        let id = RequestId::new();

        assert_eq!(
            namespaced(REQUEST_NAMESPACE, &request_key(&id)),
            format!("receiver:{}", id)
        );
    }
}
