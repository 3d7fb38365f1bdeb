//! Redis cache manager implementation

use async_trait::async_trait;
use client_manager_core::{CacheService, CacheStats, ManagerError, ManagerResult, RedisConfig};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

/// Redis cache manager backed by a multiplexed, auto-reconnecting connection
pub struct RedisCacheManager {
    /// Shared connection; clones are cheap handles to the same connection
    conn: ConnectionManager,
    /// Cache statistics
    stats: Arc<RwLock<CacheStats>>,
}

impl RedisCacheManager {
    /// Connect to Redis and verify the connection with PING
    ///
    /// The whole handshake is bounded by `connection_timeout_seconds`.
    pub async fn new(config: &RedisConfig) -> ManagerResult<Self> {
        if !config.enabled {
            return Err(ManagerError::Config("Cache is disabled".to_string()));
        }

        let url = config.build_url();
        info!(
            "Creating Redis cache manager for {}:{} (db {})",
            config.host, config.port, config.database
        );

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let connect = async {
            let client = redis::Client::open(url).map_err(|e| ManagerError::cache_error(e.to_string()))?;
            let mut conn = client
                .get_connection_manager()
                .await
                .map_err(|e| ManagerError::cache_error(e.to_string()))?;

            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| ManagerError::cache_error(e.to_string()))?;

            Ok::<_, ManagerError>(conn)
        };

        let conn = tokio::time::timeout(timeout, connect).await.map_err(|_| {
            ManagerError::cache_error(format!("Redis connection timed out after {:?}", timeout))
        })??;

        info!("Redis cache manager created successfully");

        Ok(Self {
            conn,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        })
    }

    async fn record_error(&self, op: &str, key: &str, err: &redis::RedisError) -> ManagerError {
        error!("Cache {} failed for key {}: {}", op, key, err);
        self.stats.write().await.errors += 1;
        ManagerError::cache_error(err.to_string())
    }
}

#[async_trait]
impl CacheService for RedisCacheManager {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> ManagerResult<Option<String>> {
        debug!("Cache GET: {}", key);
        let mut conn = self.conn.clone();

        let result: Option<String> = match redis::cmd("GET").arg(key).query_async(&mut conn).await {
            Ok(value) => value,
            Err(e) => return Err(self.record_error("GET", key, &e).await),
        };

        let mut stats = self.stats.write().await;
        match result {
            Some(value) => {
                debug!("Cache HIT: {}", key);
                stats.hits += 1;
                Ok(Some(value))
            }
            None => {
                debug!("Cache MISS: {}", key);
                stats.misses += 1;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ManagerResult<()> {
        debug!("Cache SET: {} with TTL: {:?}", key, ttl);
        let mut conn = self.conn.clone();

        // SETEX rejects a zero expiry
        let ttl_seconds = ttl.as_secs().max(1);
        let result: redis::RedisResult<()> = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            return Err(self.record_error("SET", key, &e).await);
        }

        self.stats.write().await.sets += 1;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> ManagerResult<bool> {
        debug!("Cache DELETE: {}", key);
        let mut conn = self.conn.clone();

        let removed: i64 = match redis::cmd("DEL").arg(key).query_async(&mut conn).await {
            Ok(count) => count,
            Err(e) => return Err(self.record_error("DELETE", key, &e).await),
        };

        self.stats.write().await.deletes += 1;
        Ok(removed > 0)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> ManagerResult<bool> {
        let mut conn = self.conn.clone();

        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match result {
            Ok(reply) => Ok(reply == "PONG"),
            Err(e) => Err(self.record_error("PING", "-", &e).await),
        }
    }

    async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
