use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use client_manager_core::{CacheService, ConfigurationEntry, ConfigurationRepository, ManagerError};
use client_manager_domain::ConfigurationService;
use client_manager_infrastructure::cache::{config_cache_key, CachedConfigurationRepository, CONFIG_CACHE_TTL};
use client_manager_testing_utils::{MockCacheService, MockConfigurationRepository};

struct Fixture {
    store: MockConfigurationRepository,
    cache: MockCacheService,
    repo: CachedConfigurationRepository,
}

fn fixture() -> Fixture {
    let store = MockConfigurationRepository::new();
    let cache = MockCacheService::new();
    let repo = CachedConfigurationRepository::new(
        Arc::new(store.clone()),
        Some(Arc::new(cache.clone()) as Arc<dyn CacheService>),
    );
    Fixture { store, cache, repo }
}

#[tokio::test(start_paused = true)]
async fn test_miss_falls_back_to_store_and_populates_cache() -> Result<()> {
    let f = fixture();
    f.store.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;

    let entry = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(entry.value, "30");
    assert!(entry.is_persisted());
    assert_eq!(f.cache.peek("config:build:timeout").as_deref(), Some("30"));
    assert_eq!(f.cache.ttl("config:build:timeout"), Some(CONFIG_CACHE_TTL));

    // 第二次读取命中缓存，不再访问存储
    f.store.reset_reads();
    let cached = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(cached.value, "30");
    assert_eq!(f.store.key_reads(), 0);

    Ok(())
}

#[tokio::test]
async fn test_cache_hit_yields_value_only_entry() -> Result<()> {
    let f = fixture();
    f.cache.insert_raw(&config_cache_key("build", "timeout"), "45", CONFIG_CACHE_TTL);

    let entry = f.repo.get_by_key("build", "timeout").await?.expect("cache hit");

    assert_eq!(entry.value, "45");
    assert_eq!(entry.id, 0);
    assert!(entry.description.is_empty());
    assert!(entry.created_at.is_none());
    assert!(entry.is_cache_synthesized());
    assert_eq!(f.store.key_reads(), 0);

    Ok(())
}

#[tokio::test]
async fn test_cache_read_failure_is_transparent() -> Result<()> {
    let f = fixture();
    f.store.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    f.cache.set_fail_reads(true);

    let entry = f.repo.get_by_key("build", "timeout").await?;

    assert_eq!(entry.map(|e| e.value).as_deref(), Some("30"));
    assert_eq!(f.store.key_reads(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cache_write_failures_do_not_fail_writes() -> Result<()> {
    let f = fixture();
    f.cache.set_unavailable(true);

    let created = f.repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;

    let mut changed = created.clone();
    changed.value = "60".to_string();
    let updated = f.repo.update(&changed).await?;
    assert_eq!(updated.value, "60");

    f.repo.delete(created.id).await?;
    assert!(f.store.is_deleted(created.id));

    assert!(f.cache.get_stats().await.errors >= 3);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_is_propagated() {
    let f = fixture();
    f.store.set_failing(true);

    let err = f.repo.get_by_key("build", "timeout").await.unwrap_err();

    assert!(matches!(err, ManagerError::DatabaseOperation(_)));
    assert!(f.cache.is_empty());
}

#[tokio::test]
async fn test_no_cache_mode_matches_direct_store_access() -> Result<()> {
    let store = MockConfigurationRepository::new();
    let repo = CachedConfigurationRepository::new(Arc::new(store.clone()), None);
    assert!(!repo.is_cache_enabled());

    let created = repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    let fetched = repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(fetched, created);

    let mut changed = created.clone();
    changed.value = "60".to_string();
    repo.update(&changed).await?;
    let fetched = repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(fetched.value, "60");
    assert!(fetched.is_persisted());

    repo.delete(created.id).await?;
    assert!(repo.get_by_key("build", "timeout").await?.is_none());
    assert!(repo.delete(created.id).await.unwrap_err().is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_create_invalidates_stale_cached_value() -> Result<()> {
    let f = fixture();
    f.cache.insert_raw("config:build:timeout", "stale", CONFIG_CACHE_TTL);

    f.repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    assert_eq!(f.cache.peek("config:build:timeout"), None);

    let entry = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(entry.value, "30");
    Ok(())
}

#[tokio::test]
async fn test_update_refreshes_cached_value() -> Result<()> {
    let f = fixture();
    let created = f.repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    f.repo.get_by_key("build", "timeout").await?;
    assert_eq!(f.cache.peek("config:build:timeout").as_deref(), Some("30"));

    let mut changed = created.clone();
    changed.value = "60".to_string();
    f.repo.update(&changed).await?;

    assert_eq!(f.cache.peek("config:build:timeout").as_deref(), Some("60"));
    let entry = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(entry.value, "60");
    Ok(())
}

#[tokio::test]
async fn test_delete_removes_cached_value() -> Result<()> {
    let f = fixture();
    let created = f.repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    f.repo.get_by_key("build", "timeout").await?;

    f.repo.delete(created.id).await?;

    assert_eq!(f.cache.peek("config:build:timeout"), None);
    assert!(f.repo.get_by_key("build", "timeout").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_delete_missing_id_fails_before_store_delete() {
    let f = fixture();

    let err = f.repo.delete(42).await.unwrap_err();

    assert!(matches!(err, ManagerError::ConfigurationIdNotFound { id: 42 }));
    assert_eq!(f.cache.get_stats().await.deletes, 0);
}

#[tokio::test(start_paused = true)]
async fn test_cached_value_expires_after_ttl() -> Result<()> {
    let f = fixture();
    let created = f.repo.create(&ConfigurationEntry::new("build", "timeout", "30")).await?;
    f.repo.get_by_key("build", "timeout").await?;

    // 绕过缓存直接修改存储
    let mut changed = created.clone();
    changed.value = "99".to_string();
    f.store.update(&changed).await?;

    tokio::time::advance(CONFIG_CACHE_TTL - Duration::from_secs(1)).await;
    let entry = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(entry.value, "30");

    tokio::time::advance(Duration::from_secs(2)).await;
    let entry = f.repo.get_by_key("build", "timeout").await?.expect("entry should exist");
    assert_eq!(entry.value, "99");
    Ok(())
}

#[tokio::test]
async fn test_create_then_fetch_through_service() -> Result<()> {
    let f = fixture();
    let cache = f.cache.clone();
    let service = ConfigurationService::new(Arc::new(f.repo));

    let request = client_manager_core::CreateConfigurationRequest {
        namespace: Some("build".to_string()),
        key: Some("timeout".to_string()),
        value: Some("30".to_string()),
        description: None,
    };
    service.create_configuration(request).await?;

    let entry = service.get_configuration("build", "timeout").await?;
    assert_eq!(entry.value, "30");
    assert_eq!(cache.peek("config:build:timeout").as_deref(), Some("30"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stale_cached_value_does_not_block_service_create() -> Result<()> {
    let f = fixture();
    let cache = f.cache.clone();
    // 记录已不存在，但删除时缓存失效没有成功
    cache.insert_raw("config:build:timeout", "stale", Duration::from_secs(300));
    let service = ConfigurationService::new(Arc::new(f.repo));

    let request = client_manager_core::CreateConfigurationRequest {
        namespace: Some("build".to_string()),
        key: Some("timeout".to_string()),
        value: Some("30".to_string()),
        description: None,
    };
    let created = service.create_configuration(request).await?;
    assert!(created.is_persisted());
    assert_eq!(cache.peek("config:build:timeout"), None);

    let entry = service.get_configuration("build", "timeout").await?;
    assert_eq!(entry.value, "30");
    Ok(())
}

#[tokio::test]
async fn test_fetch_missing_is_not_found_without_cache_write() {
    let f = fixture();
    let cache = f.cache.clone();
    let service = ConfigurationService::new(Arc::new(f.repo));

    let err = service.get_configuration("nonexistent", "x").await.unwrap_err();

    assert!(matches!(err, ManagerError::ConfigurationNotFound { .. }));
    assert!(cache.is_empty());
    assert_eq!(cache.get_stats().await.sets, 0);
}
