//! Redis cache backend.
//!
//! The `ConnectionManager` is created on first use rather than at startup, so a
//! service can boot while Redis is down and report it through `/health`.
//! Every command is bounded by `OPERATION_TIMEOUT`.

use super::{CacheBackend, CacheError, CacheResult};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;

const OPERATION_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedisCache {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Accepts `host:port` or a full `redis://` URL.
    pub fn new(addr: &str) -> CacheResult<Self> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };

        let client = redis::Client::open(url.as_str())
            .map_err(|e| CacheError::Connection(format!("Invalid Redis address: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());
                match tokio::time::timeout(CONNECT_TIMEOUT, connect).await {
                    Ok(Ok(manager)) => {
                        tracing::info!("Connected to Redis");
                        Ok(manager)
                    }
                    Ok(Err(e)) => Err(CacheError::Connection(format!(
                        "Failed to connect to Redis: {}",
                        e
                    ))),
                    Err(_) => Err(CacheError::Timeout("connect".to_string())),
                }
            })
            .await?;

        Ok(manager.clone())
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(OPERATION_TIMEOUT, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Backend(format!("Redis {} failed: {}", op, e))),
            Err(_) => Err(CacheError::Timeout(op.to_string())),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let result: Option<String> = self
            .bounded("GET", redis::cmd("GET").arg(key).query_async(&mut conn))
            .await?;

        if result.is_some() {
            tracing::debug!(key = key, "Cache HIT");
        } else {
            tracing::debug!(key = key, "Cache MISS");
        }
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let ttl_seconds = ttl.as_secs().max(1);

        self.bounded(
            "SETEX",
            redis::cmd("SETEX")
                .arg(key)
                .arg(ttl_seconds)
                .arg(value)
                .query_async::<()>(&mut conn),
        )
        .await?;

        tracing::debug!(key = key, ttl_seconds = ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        self.bounded(
            "DEL",
            redis::cmd("DEL").arg(key).query_async::<()>(&mut conn),
        )
        .await?;

        tracing::debug!(key = key, "Cache DEL");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let pong: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}
