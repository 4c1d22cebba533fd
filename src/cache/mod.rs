/// Redis-based ephemeral cache tier
///
/// Both provider paths use this for hot lookups: the places path as its only
/// cache, the weather path as the fast tier in front of the durable store.
/// Values are serialized JSON strings; TTL expiry is enforced by Redis
/// itself. There is no atomicity across get+set; concurrent misses on one
/// key may both write, which is accepted (writes are idempotent per key and
/// freshness window).
use crate::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info, warn};

/// Ephemeral cache backend contract
///
/// Implementations store opaque serialized values under string keys with a
/// per-entry TTL. Once expired, `get` returns None.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a serialized value, or None on miss/expiry
    async fn get(&self, key: &str) -> GatewayResult<Option<String>>;

    /// Set a serialized value with a TTL in seconds
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> GatewayResult<()>;
}

/// Redis cache client
#[derive(Clone)]
pub struct CacheClient {
    connection: ConnectionManager,
}

impl CacheClient {
    /// Connect to Redis
    pub async fn connect(redis_url: &str) -> GatewayResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            GatewayError::Cache(format!("Redis client creation failed: {}", e))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to connect to Redis: {}", e);
            GatewayError::Cache(format!("Redis connection failed: {}", e))
        })?;

        info!("Redis connection established");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheBackend for CacheClient {
    async fn get(&self, key: &str) -> GatewayResult<Option<String>> {
        debug!("Cache GET: {}", key);

        let mut conn = self.connection.clone();
        let result: Option<String> = conn.get(key).await.map_err(|e| {
            warn!("Redis GET failed for {}: {}", key, e);
            GatewayError::Cache(format!("Cache get failed: {}", e))
        })?;

        match &result {
            Some(_) => debug!("Cache HIT: {}", key),
            None => debug!("Cache MISS: {}", key),
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> GatewayResult<()> {
        debug!("Cache SET: {} (TTL: {}s)", key, ttl_secs);

        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await.map_err(|e| {
            warn!("Redis SET failed for {}: {}", key, e);
            GatewayError::Cache(format!("Cache set failed: {}", e))
        })?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryCache;
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("maps:search:kyiv").await.unwrap(), None);

        cache
            .set("maps:search:kyiv", r#"[{"name":"x"}]"#, 60)
            .await
            .unwrap();

        assert_eq!(
            cache.get("maps:search:kyiv").await.unwrap().as_deref(),
            Some(r#"[{"name":"x"}]"#)
        );
    }
}
