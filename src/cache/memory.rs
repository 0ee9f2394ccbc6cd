use super::{CacheBackend, CacheResult};

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// In-process cache backend.
///
/// Each entry carries its own deadline; expired entries read as absent and are
/// removed on the read that discovers them. A TTL too large to represent as an
/// `Instant` means the entry never expires.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Option<Instant>)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, (_, expires_at)| expires_at.is_some_and(|at| at <= now));
        if removed.is_some() {
            tracing::debug!(key = key, "Cache EXPIRED (memory)");
            return Ok(None);
        }

        let value = self.entries.get(key).map(|entry| entry.value().0.clone());
        if value.is_some() {
            tracing::debug!(key = key, "Cache HIT (memory)");
        } else {
            tracing::debug!(key = key, "Cache MISS (memory)");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.to_string(), (value.to_string(), expires_at));
        tracing::debug!(key = key, ttl_ms = ttl.as_millis() as u64, "Cache SET (memory)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
