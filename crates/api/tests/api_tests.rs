use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use client_manager_api::{create_app, AppState};
use client_manager_core::{AppConfig, CacheService, DatabaseConfig, RequestCounters};
use client_manager_domain::{ConfigurationService, FeedbackService, LogService};
use client_manager_infrastructure::{CachedConfigurationRepository, DatabaseManager};
use client_manager_testing_utils::MockCacheService;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE: &str = "/client-manager/api/v1";

struct TestApp {
    router: Router,
    cache: MockCacheService,
    counters: Arc<RequestCounters>,
}

async fn test_app(with_cache: bool) -> Result<TestApp> {
    let database = Arc::new(
        DatabaseManager::new(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        })
        .await?,
    );
    database.migrate().await?;

    let cache = MockCacheService::new();
    let cache_service: Option<Arc<dyn CacheService>> = if with_cache {
        Some(Arc::new(cache.clone()))
    } else {
        None
    };

    let configurations = Arc::new(CachedConfigurationRepository::new(
        database.configuration_repository(),
        cache_service.clone(),
    ));
    let counters = Arc::new(RequestCounters::new());

    let state = AppState {
        configuration_service: Arc::new(ConfigurationService::new(configurations)),
        feedback_service: Arc::new(FeedbackService::new(database.feedback_repository())),
        log_service: Arc::new(LogService::new(database.client_log_repository())),
        database,
        cache: cache_service,
        counters: counters.clone(),
        prometheus: Some(PrometheusBuilder::new().build_recorder().handle()),
    };

    Ok(TestApp {
        router: create_app(state, &AppConfig::default()),
        cache,
        counters,
    })
}

async fn send(app: &TestApp, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(format!("{BASE}{path}"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_configuration_lifecycle() -> Result<()> {
    let app = test_app(true).await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/configurations",
        Some(json!({"namespace": "build", "key": "timeout", "value": "30", "description": "构建超时"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "success");
    let id = body["data"]["id"].as_i64().expect("id");

    let (status, body) = send(&app, Method::GET, "/namespaces/build/configurations/timeout", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "30");
    assert_eq!(app.cache.peek("config:build:timeout").as_deref(), Some("30"));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/configurations/{id}"),
        Some(json!({"value": "60"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "60");
    assert_eq!(body["data"]["description"], "构建超时");

    let (_, body) = send(&app, Method::GET, "/namespaces/build/configurations/timeout", None).await?;
    assert_eq!(body["data"]["value"], "60");

    let (status, _) = send(&app, Method::DELETE, &format!("/configurations/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/namespaces/build/configurations/timeout", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "notfound.error");

    let (status, _) = send(&app, Method::DELETE, &format!("/configurations/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_configuration_errors() -> Result<()> {
    let app = test_app(true).await?;
    let entry = json!({"namespace": "build", "key": "timeout", "value": "30"});

    send(&app, Method::POST, "/configurations", Some(entry.clone())).await?;
    let (status, body) = send(&app, Method::POST, "/configurations", Some(entry)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict.error");
    assert_eq!(body["message"], "configuration already exists");

    let (status, body) = send(&app, Method::POST, "/configurations", Some(json!({"key": "timeout"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation.error");
    assert_eq!(body["field"], "namespace");

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{BASE}/configurations"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["field"], "body");

    let (status, body) = send(&app, Method::PUT, "/configurations/abc", Some(json!({"value": "1"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "path");

    let (status, _) = send(&app, Method::PUT, "/configurations/999", Some(json!({"value": "1"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_configuration_listing() -> Result<()> {
    let app = test_app(false).await?;

    for (namespace, key) in [("build", "timeout"), ("build", "retries"), ("ui", "theme")] {
        send(
            &app,
            Method::POST,
            "/configurations",
            Some(json!({"namespace": namespace, "key": key, "value": "v"})),
        )
        .await?;
    }

    let (status, body) = send(&app, Method::GET, "/configurations?page=1&page_size=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/configurations?search=ui&page_size=oops", None).await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["page_size"], 20);

    let (_, body) = send(&app, Method::GET, "/namespaces/build/configurations", None).await?;
    let keys: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|e| e["key"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["retries", "timeout"]);

    Ok(())
}

#[tokio::test]
async fn test_feedback_endpoints() -> Result<()> {
    let app = test_app(true).await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/feedbacks/completion",
        Some(json!({"conversation_id": "conv-1", "user_id": "u1", "content": "fn main() {}"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "completion");

    let (status, body) = send(
        &app,
        Method::POST,
        "/feedbacks/completions",
        Some(json!([
            {"conversation_id": "conv-1", "content": "a"},
            {"content": "missing conversation"},
            {"conversation_id": "conv-2", "content": "b"}
        ])),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created_count"], 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/feedbacks/evaluate",
        Some(json!({"conversation_id": "conv-1", "evaluation_type": "meh"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "evaluation_type");

    let (status, _) = send(
        &app,
        Method::POST,
        "/feedbacks/issue",
        Some(json!({"description": "补全结果错误", "issue_type": "wrong_answer"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/feedbacks/conversations/conv-1", None).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/feedbacks/types/completion?page_size=2", None).await?;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(2));

    let (status, _) = send(&app, Method::GET, "/feedbacks/types/thumbs_up", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/feedbacks/stats?start_date={today}&end_date={today}"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_count"], 4);
    assert_eq!(body["data"]["type_counts"]["issue"], 1);

    let (status, body) = send(&app, Method::GET, "/feedbacks/stats", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "start_date");

    Ok(())
}

#[tokio::test]
async fn test_log_endpoints() -> Result<()> {
    let app = test_app(true).await?;

    for (module, start, end) in [("editor", true, false), ("terminal", false, false), ("editor", false, true)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/logs",
            Some(json!({
                "client_id": "c1",
                "user_id": "u1",
                "module_name": module,
                "log_content": "line",
                "start_flag": start,
                "end_flag": end
            })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::POST, "/logs", Some(json!({"client_id": "c1"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "module_name");

    let (_, body) = send(&app, Method::GET, "/logs/clients/c1", None).await?;
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = send(&app, Method::GET, "/logs/clients/c1/sessions", None).await?;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = send(&app, Method::GET, "/logs/users/u1", None).await?;
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = send(&app, Method::GET, "/logs/modules/terminal", None).await?;
    assert_eq!(body["data"]["total"], 1);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/logs/stats?start_date={today}&end_date={today}"),
        None,
    )
    .await?;
    assert_eq!(body["data"]["total_count"], 3);
    assert_eq!(body["data"]["module_counts"]["editor"], 2);

    let (status, body) = send(&app, Method::DELETE, "/logs?before_date=2000-01-01", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_count"], 0);

    let (status, _) = send(&app, Method::DELETE, "/logs", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_health_reports_dependencies_and_counters() -> Result<()> {
    let app = test_app(true).await?;

    send(&app, Method::GET, "/configurations", None).await?;
    send(&app, Method::GET, "/namespaces/none/configurations/x", None).await?;

    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
    assert_eq!(body["cache"], "up");
    assert_eq!(body["requests"]["total_requests"], 2);
    assert_eq!(body["requests"]["total_errors"], 1);
    assert_eq!(body["requests"]["in_flight"], 1);

    app.cache.set_unavailable(true);
    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["cache"], "down");

    assert_eq!(app.counters.request_count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_health_without_cache() -> Result<()> {
    let app = test_app(false).await?;

    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"], "disabled");
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_metrics_and_unknown_routes() -> Result<()> {
    let app = test_app(true).await?;

    let request = Request::builder()
        .uri(format!("{BASE}/metrics"))
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let (status, body) = send(&app, Method::GET, "/no-such-route", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "notfound.error");

    Ok(())
}

#[tokio::test]
async fn test_stale_cached_value_does_not_block_create() -> Result<()> {
    let app = test_app(true).await?;
    app.cache
        .insert_raw("config:build:timeout", "stale", std::time::Duration::from_secs(300));

    let (status, body) = send(
        &app,
        Method::POST,
        "/configurations",
        Some(json!({"namespace": "build", "key": "timeout", "value": "30"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = send(&app, Method::GET, "/namespaces/build/configurations/timeout", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "30");

    Ok(())
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() -> Result<()> {
    let app = test_app(false).await?;
    send(
        &app,
        Method::POST,
        "/configurations",
        Some(json!({"namespace": "build", "key": "timeout", "value": "30"})),
    )
    .await?;

    let page = i64::MAX;
    for path in [
        format!("/configurations?page={page}"),
        format!("/feedbacks/types/completion?page={page}"),
        format!("/logs/clients/vscode?page={page}"),
        format!("/logs/clients/vscode/sessions?page={page}"),
        format!("/logs/users/alice?page={page}"),
        format!("/logs/modules/editor?page={page}"),
    ] {
        let (status, body) = send(&app, Method::GET, &path, None).await?;
        assert_eq!(status, StatusCode::OK, "{path}: {body}");
        assert_eq!(body["data"]["items"], json!([]), "{path}");
        assert_eq!(body["data"]["page"], page, "{path}");
    }

    assert_eq!(app.counters.in_flight(), 0);
    Ok(())
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() -> Result<()> {
    let app = test_app(false).await?;
    for key in ["a_b", "axb", "100%"] {
        send(
            &app,
            Method::POST,
            "/configurations",
            Some(json!({"namespace": "misc", "key": key, "value": "1"})),
        )
        .await?;
    }

    let (_, body) = send(&app, Method::GET, "/configurations?search=a_b", None).await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["key"], "a_b");

    let (_, body) = send(&app, Method::GET, "/configurations?search=100%25", None).await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["key"], "100%");

    Ok(())
}
