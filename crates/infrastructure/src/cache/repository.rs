//! Cache-aside decorator for the configuration repository

use super::{config_cache_key, CONFIG_CACHE_TTL};
use async_trait::async_trait;
use client_manager_core::{
    CacheService, ConfigurationEntry, ConfigurationFilter, ConfigurationRepository, ManagerError, ManagerResult,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

fn record_cache_operation(operation: &'static str, result: &'static str) {
    metrics::counter!(
        "config_cache_operations_total",
        "operation" => operation,
        "result" => result
    )
    .increment(1);
}

/// Cached configuration repository wrapper
///
/// Reads by composite key go to the cache first and fall back to the inner
/// repository; writes go to the inner repository first and then touch the
/// cache. Cache failures are logged and never returned to the caller.
/// With `cache` set to `None` every call goes straight to the inner repository.
pub struct CachedConfigurationRepository {
    /// Inner repository implementation
    inner: Arc<dyn ConfigurationRepository>,
    /// Cache service, absent when running without Redis
    cache: Option<Arc<dyn CacheService>>,
}

impl CachedConfigurationRepository {
    pub fn new(inner: Arc<dyn ConfigurationRepository>, cache: Option<Arc<dyn CacheService>>) -> Self {
        Self { inner, cache }
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Store the entry's value under its key with a fresh TTL
    async fn populate(&self, cache: &dyn CacheService, entry: &ConfigurationEntry) {
        let cache_key = config_cache_key(&entry.namespace, &entry.key);
        match cache.set(&cache_key, &entry.value, CONFIG_CACHE_TTL).await {
            Ok(()) => record_cache_operation("set", "ok"),
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Failed to cache configuration value");
                record_cache_operation("set", "error");
            }
        }
    }

    /// Drop the cached value for a composite key
    async fn invalidate(&self, namespace: &str, key: &str) {
        let Some(cache) = &self.cache else {
            return;
        };

        let cache_key = config_cache_key(namespace, key);
        match cache.delete(&cache_key).await {
            Ok(_) => record_cache_operation("delete", "ok"),
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Failed to invalidate cached configuration");
                record_cache_operation("delete", "error");
            }
        }
    }
}

#[async_trait]
impl ConfigurationRepository for CachedConfigurationRepository {
    #[instrument(skip(self))]
    async fn get_by_key(&self, namespace: &str, key: &str) -> ManagerResult<Option<ConfigurationEntry>> {
        if let Some(cache) = &self.cache {
            let cache_key = config_cache_key(namespace, key);
            match cache.get(&cache_key).await {
                Ok(Some(value)) => {
                    debug!("Cache hit for configuration: {}", cache_key);
                    record_cache_operation("get", "hit");
                    return Ok(Some(ConfigurationEntry::from_cached_value(namespace, key, value)));
                }
                Ok(None) => {
                    debug!("Cache miss for configuration: {}", cache_key);
                    record_cache_operation("get", "miss");
                }
                Err(e) => {
                    warn!(key = %cache_key, error = %e, "Cache read failed, falling back to database");
                    record_cache_operation("get", "error");
                }
            }
        }

        let entry = self.inner.get_by_key(namespace, key).await?;

        if let (Some(cache), Some(entry)) = (&self.cache, &entry) {
            self.populate(cache.as_ref(), entry).await;
        }

        Ok(entry)
    }

    /// Always answered by the inner repository; a stale cached value must not block a create.
    async fn exists_by_key(&self, namespace: &str, key: &str) -> ManagerResult<bool> {
        self.inner.exists_by_key(namespace, key).await
    }

    async fn get_by_id(&self, id: i64) -> ManagerResult<Option<ConfigurationEntry>> {
        self.inner.get_by_id(id).await
    }

    /// Removes any value cached under the key before the entry existed.
    #[instrument(skip(self, entry), fields(namespace = %entry.namespace, key = %entry.key))]
    async fn create(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        let created = self.inner.create(entry).await?;
        self.invalidate(&created.namespace, &created.key).await;
        Ok(created)
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn update(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        let updated = self.inner.update(entry).await?;

        if let Some(cache) = &self.cache {
            self.populate(cache.as_ref(), &updated).await;
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> ManagerResult<()> {
        let existing = self
            .inner
            .get_by_id(id)
            .await?
            .ok_or(ManagerError::ConfigurationIdNotFound { id })?;

        self.inner.delete(id).await?;
        self.invalidate(&existing.namespace, &existing.key).await;
        Ok(())
    }

    async fn list(&self, filter: &ConfigurationFilter) -> ManagerResult<Vec<ConfigurationEntry>> {
        self.inner.list(filter).await
    }

    async fn count(&self, filter: &ConfigurationFilter) -> ManagerResult<i64> {
        self.inner.count(filter).await
    }

    async fn list_by_namespace(&self, namespace: &str) -> ManagerResult<Vec<ConfigurationEntry>> {
        self.inner.list_by_namespace(namespace).await
    }
}
