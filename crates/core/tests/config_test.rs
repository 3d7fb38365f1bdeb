use client_manager_core::config::*;
use std::env;
use std::fs;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    // 验证默认值
    assert_eq!(config.api.bind_address, "0.0.0.0:8080");
    assert_eq!(config.database.max_connections, 10);
    assert!(config.database.is_sqlite());
    assert!(config.redis.enabled);
    assert_eq!(config.observability.metrics_endpoint, "/metrics");
}

#[test]
fn test_partial_toml_falls_back_to_defaults() {
    let toml_content = r#"
[database]
url = "postgresql://test:5432/client_manager_test"
max_connections = 15

[redis]
enabled = false
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();
    assert_eq!(config.database.max_connections, 15);
    assert_eq!(config.database.min_connections, 1);
    assert!(config.database.is_postgres());
    assert!(!config.redis.enabled);
    assert_eq!(config.api.request_timeout_seconds, 30);
}

#[test]
fn test_invalid_toml_values_rejected() {
    let toml_content = r#"
[observability]
log_level = "verbose"
"#;
    assert!(AppConfig::from_toml(toml_content).is_err());

    let toml_content = r#"
[api]
bind_address = "no-port"
"#;
    assert!(AppConfig::from_toml(toml_content).is_err());
}

#[test]
fn test_load_from_file() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"
[api]
bind_address = "127.0.0.1:9090"

[database]
url = "sqlite::memory:"
max_connections = 1
"#,
    )
    .unwrap();

    let config = AppConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.api.bind_address, "127.0.0.1:9090");
    assert!(config.database.is_in_memory());
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_load_missing_file_fails() {
    let result = AppConfig::load(Some("/nonexistent/client-manager.toml"));
    assert!(result.is_err());
}

#[test]
fn test_environment_overrides_file() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"
[redis]
port = 6379
"#,
    )
    .unwrap();

    env::set_var("CLIENT_MANAGER_REDIS__PORT", "6380");
    let config = AppConfig::load(file.path().to_str());
    env::remove_var("CLIENT_MANAGER_REDIS__PORT");

    assert_eq!(config.unwrap().redis.port, 6380);
}

#[test]
fn test_toml_round_trip() {
    let config = AppConfig::default();
    let serialized = config.to_toml().unwrap();
    let parsed = AppConfig::from_toml(&serialized).unwrap();
    assert_eq!(parsed.database.url, config.database.url);
    assert_eq!(parsed.redis.build_url(), config.redis.build_url());
}
