//! Redis-based caching for configuration lookups
//!
//! Configuration values are cached under `config:{namespace}:{key}` with a
//! fixed five minute TTL. Only the value string is cached, so a cache hit
//! yields an entry without database metadata (id 0, empty description,
//! no timestamps). The key format is shared with other processes that read
//! the cache directly and must not change.

pub mod manager;
pub mod repository;

pub use manager::*;
pub use repository::*;

use std::time::Duration;

/// Cache key prefix for configuration values
pub const CONFIG_CACHE_PREFIX: &str = "config";

/// Configuration cache TTL (5 minutes)
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Generate cache key for a configuration value
pub fn config_cache_key(namespace: &str, key: &str) -> String {
    format!("{}:{}:{}", CONFIG_CACHE_PREFIX, namespace, key)
}
