use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ManagerResult;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache service trait for dependency injection
///
/// `get` separates the three outcomes callers care about:
/// `Ok(Some(value))` is a hit, `Ok(None)` is a miss, `Err(_)` is an
/// operational failure (connection refused, timeout, protocol error).
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get a string value
    async fn get(&self, key: &str) -> ManagerResult<Option<String>>;

    /// Set a value with TTL, replacing any previous value and its TTL
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ManagerResult<()>;

    /// Delete a key, returns whether it existed
    async fn delete(&self, key: &str) -> ManagerResult<bool>;

    /// Round-trip check against the backend
    async fn health_check(&self) -> ManagerResult<bool>;

    async fn get_stats(&self) -> CacheStats;
}
