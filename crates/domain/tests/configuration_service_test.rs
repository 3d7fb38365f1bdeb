use std::sync::Arc;

use client_manager_core::{ManagerError, PageRequest, UpdateConfigurationRequest};
use client_manager_domain::ConfigurationService;
use client_manager_testing_utils::{ConfigurationBuilder, MockConfigurationRepository};

fn service_with(repo: &MockConfigurationRepository) -> ConfigurationService {
    ConfigurationService::new(Arc::new(repo.clone()))
}

#[tokio::test]
async fn test_create_and_get_configuration() {
    let repo = MockConfigurationRepository::new();
    let service = service_with(&repo);

    let request = ConfigurationBuilder::new()
        .with_namespace("build")
        .with_key("timeout")
        .with_value("30")
        .with_description("构建超时")
        .build_request();
    let created = service.create_configuration(request).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.description, "构建超时");

    let fetched = service.get_configuration("build", "timeout").await.unwrap();
    assert_eq!(fetched.value, "30");
}

#[tokio::test]
async fn test_create_requires_namespace_and_key() {
    let repo = MockConfigurationRepository::new();
    let service = service_with(&repo);

    let mut request = ConfigurationBuilder::new().build_request();
    request.namespace = None;
    match service.create_configuration(request).await {
        Err(ManagerError::Validation { field, .. }) => assert_eq!(field, "namespace"),
        other => panic!("unexpected: {other:?}"),
    }

    let mut request = ConfigurationBuilder::new().build_request();
    request.key = Some("  ".to_string());
    match service.create_configuration(request).await {
        Err(ManagerError::Validation { field, .. }) => assert_eq!(field, "key"),
        other => panic!("unexpected: {other:?}"),
    }

    assert_eq!(repo.count(), 0);
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let repo = MockConfigurationRepository::with_entries(vec![ConfigurationBuilder::new().build()]);
    let service = service_with(&repo);

    let err = service
        .create_configuration(ConfigurationBuilder::new().with_value("99").build_request())
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(repo.count(), 1);
}

#[tokio::test]
async fn test_create_defaults_optional_fields() {
    let repo = MockConfigurationRepository::new();
    let service = service_with(&repo);

    let mut request = ConfigurationBuilder::new().build_request();
    request.value = None;
    request.description = None;

    let created = service.create_configuration(request).await.unwrap();
    assert_eq!(created.value, "");
    assert_eq!(created.description, "");
}

#[tokio::test]
async fn test_get_missing_configuration_is_not_found() {
    let service = service_with(&MockConfigurationRepository::new());

    let err = service.get_configuration("nonexistent", "x").await.unwrap_err();
    assert!(matches!(err, ManagerError::ConfigurationNotFound { .. }));

    assert!(service.get_configuration("", "x").await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_update_merges_present_fields() {
    let repo = MockConfigurationRepository::with_entries(vec![ConfigurationBuilder::new()
        .with_id(7)
        .with_description("构建超时")
        .build()]);
    let service = service_with(&repo);

    let updated = service
        .update_configuration(
            7,
            UpdateConfigurationRequest {
                value: Some("60".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.value, "60");
    assert_eq!(updated.description, "构建超时");
    assert_eq!(updated.key, "timeout");
}

#[tokio::test]
async fn test_update_rejects_blank_key_and_missing_id() {
    let repo = MockConfigurationRepository::with_entries(vec![ConfigurationBuilder::new().with_id(1).build()]);
    let service = service_with(&repo);

    let blank_key = UpdateConfigurationRequest {
        key: Some(String::new()),
        ..Default::default()
    };
    assert!(service.update_configuration(1, blank_key).await.unwrap_err().is_validation());

    let err = service
        .update_configuration(404, UpdateConfigurationRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::ConfigurationIdNotFound { id: 404 }));
}

#[tokio::test]
async fn test_update_onto_existing_key_is_conflict() {
    let repo = MockConfigurationRepository::with_entries(vec![
        ConfigurationBuilder::new().with_id(1).with_key("timeout").build(),
        ConfigurationBuilder::new().with_id(2).with_key("retries").build(),
    ]);
    let service = service_with(&repo);

    let err = service
        .update_configuration(
            2,
            UpdateConfigurationRequest {
                key: Some("timeout".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_delete_configuration() {
    let repo = MockConfigurationRepository::with_entries(vec![ConfigurationBuilder::new().with_id(3).build()]);
    let service = service_with(&repo);

    service.delete_configuration(3).await.unwrap();
    assert!(repo.is_deleted(3));

    assert!(service.delete_configuration(3).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_configurations_paginates_and_searches() {
    let now = chrono::Utc::now();
    let entries = (1..=25)
        .map(|i| {
            ConfigurationBuilder::new()
                .with_id(i)
                .with_namespace(if i % 5 == 0 { "ui" } else { "build" })
                .with_key(&format!("key-{i:02}"))
                .with_created_at(now + chrono::Duration::seconds(i))
                .build()
        })
        .collect();
    let service = service_with(&MockConfigurationRepository::with_entries(entries));

    let first = service.list_configurations(PageRequest::default(), None).await.unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].key, "key-25");

    let second = service.list_configurations(PageRequest::new(2, 20), None).await.unwrap();
    assert_eq!(second.items.len(), 5);

    // 越界的分页参数被规整
    let normalized = service.list_configurations(PageRequest::new(0, 500), None).await.unwrap();
    assert_eq!((normalized.page, normalized.page_size), (1, 20));

    let searched = service.list_configurations(PageRequest::default(), Some("UI")).await.unwrap();
    assert_eq!(searched.total, 5);

    let blank = service.list_configurations(PageRequest::default(), Some("  ")).await.unwrap();
    assert_eq!(blank.total, 25);
}

#[tokio::test]
async fn test_get_configurations_by_namespace() {
    let repo = MockConfigurationRepository::with_entries(vec![
        ConfigurationBuilder::new().with_id(1).with_key("timeout").build(),
        ConfigurationBuilder::new().with_id(2).with_key("retries").build(),
        ConfigurationBuilder::new().with_id(3).with_namespace("ui").with_key("theme").build(),
    ]);
    let service = service_with(&repo);

    let entries = service.get_configurations_by_namespace("build").await.unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["retries", "timeout"]);

    assert!(service.get_configurations_by_namespace("empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let repo = MockConfigurationRepository::new();
    repo.set_failing(true);
    let service = service_with(&repo);

    let err = service.get_configuration("build", "timeout").await.unwrap_err();
    assert!(matches!(err, ManagerError::DatabaseOperation(_)));
}
