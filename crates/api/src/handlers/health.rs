use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use client_manager_core::CounterSnapshot;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::routes::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// healthy / degraded / unhealthy
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub database: String,
    /// up / down / disabled
    pub cache: String,
    pub requests: CounterSnapshot,
}

/// 健康检查
///
/// 数据库不可用时返回 503；缓存不可用只降级，服务仍可直连数据库工作。
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("健康检查: 数据库不可用: {}", e);
            false
        }
    };

    let cache = match &state.cache {
        None => "disabled",
        Some(cache) => match cache.health_check().await {
            Ok(true) => "up",
            Ok(false) => "down",
            Err(e) => {
                warn!("健康检查: 缓存不可用: {}", e);
                "down"
            }
        },
    };

    let (status_code, status) = match (database_up, cache) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        (true, "down") => (StatusCode::OK, "degraded"),
        (true, _) => (StatusCode::OK, "healthy"),
    };

    let report = HealthReport {
        status: status.to_string(),
        service: "client-manager".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database: if database_up { "up" } else { "down" }.to_string(),
        cache: cache.to_string(),
        requests: state.counters.snapshot(),
    };

    (status_code, Json(report))
}
