//! # Client Manager API
//!
//! 客户端遥测管理服务的 REST API，基于 Axum 构建。
//!
//! ## API 端点
//!
//! 所有端点位于 `/client-manager/api/v1` 之下。
//!
//! ### 配置项
//! - `GET /configurations` - 分页列出配置项（`page`、`page_size`、`search`）
//! - `POST /configurations` - 创建配置项
//! - `PUT /configurations/{id}` - 部分更新配置项
//! - `DELETE /configurations/{id}` - 删除配置项
//! - `GET /namespaces/{namespace}/configurations` - 命名空间下的配置项
//! - `GET /namespaces/{namespace}/configurations/{key}` - 读取单个配置项
//!
//! ### 反馈
//! - `POST /feedbacks/{completion,copy_code,evaluate,use_code,issue,error}`
//! - `POST /feedbacks/completions` - 批量补全反馈
//! - `GET /feedbacks/conversations/{conversation_id}`
//! - `GET /feedbacks/types/{feedback_type}`
//! - `GET /feedbacks/stats`
//!
//! ### 客户端日志
//! - `POST /logs`、`DELETE /logs?before_date=`
//! - `GET /logs/stats`
//! - `GET /logs/clients/{client_id}`、`GET /logs/clients/{client_id}/sessions`
//! - `GET /logs/users/{user_id}`、`GET /logs/modules/{module_name}`
//!
//! ### 运维
//! - `GET /health` - 健康检查与请求计数
//! - `GET /metrics` - Prometheus 指标
//!
//! ## 响应格式
//!
//! ### 成功响应
//!
//! ```json
//! {"code": "success", "message": "configuration retrieved", "data": {...}}
//! ```
//!
//! ### 错误响应
//!
//! ```json
//! {"code": "validation.error", "message": "namespace 不能为空", "field": "namespace"}
//! ```
//!
//! `code` 取值 `validation.error`(400)、`notfound.error`(404)、
//! `conflict.error`(409)、`internal.error`(500)。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, Router};
use client_manager_core::AppConfig;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use middleware::{cors_layer, request_logging, trace_layer, track_requests};
pub use routes::{create_routes, AppState, API_BASE_PATH};

/// 创建完整的API应用
///
/// 超过 `api.request_timeout_seconds` 的请求返回 408，处理器 panic 返回 500。
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let counters = state.counters.clone();
    let router = create_routes(state, &config.observability.metrics_endpoint)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_mb * 1024 * 1024));

    let router = if config.api.cors_enabled {
        router.layer(cors_layer(&config.api))
    } else {
        router
    };

    router.layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(axum::middleware::from_fn_with_state(counters, track_requests))
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.api.request_timeout_seconds))),
    )
}
