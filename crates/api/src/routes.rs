use axum::{
    routing::{get, post, put},
    Router,
};
use client_manager_core::{CacheService, RequestCounters};
use client_manager_domain::{ConfigurationService, FeedbackService, LogService};
use client_manager_infrastructure::DatabaseManager;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::error::ApiError;
use crate::handlers::{configurations, feedbacks, health, logs, metrics};

/// 所有接口的公共前缀
pub const API_BASE_PATH: &str = "/client-manager/api/v1";

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub configuration_service: Arc<ConfigurationService>,
    pub feedback_service: Arc<FeedbackService>,
    pub log_service: Arc<LogService>,
    /// 健康检查用
    pub database: Arc<DatabaseManager>,
    /// 未启用 Redis 时为 None
    pub cache: Option<Arc<dyn CacheService>>,
    pub counters: Arc<RequestCounters>,
    /// 指标关闭时为 None，指标端点返回 404
    pub prometheus: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState, metrics_endpoint: &str) -> Router {
    let api = Router::new()
        // 健康检查与指标
        .route("/health", get(health::health_check))
        .route(metrics_endpoint, get(metrics::get_metrics))
        // 配置项
        .route(
            "/configurations",
            get(configurations::list_configurations).post(configurations::create_configuration),
        )
        .route(
            "/configurations/{id}",
            put(configurations::update_configuration).delete(configurations::delete_configuration),
        )
        .route(
            "/namespaces/{namespace}/configurations",
            get(configurations::get_namespace_configurations),
        )
        .route(
            "/namespaces/{namespace}/configurations/{key}",
            get(configurations::get_configuration),
        )
        // 反馈
        .route("/feedbacks/completion", post(feedbacks::create_completion))
        .route("/feedbacks/completions", post(feedbacks::create_completions_batch))
        .route("/feedbacks/copy_code", post(feedbacks::create_copy_code))
        .route("/feedbacks/evaluate", post(feedbacks::create_evaluate))
        .route("/feedbacks/use_code", post(feedbacks::create_use_code))
        .route("/feedbacks/issue", post(feedbacks::create_issue))
        .route("/feedbacks/error", post(feedbacks::create_error))
        .route(
            "/feedbacks/conversations/{conversation_id}",
            get(feedbacks::get_by_conversation),
        )
        .route("/feedbacks/types/{feedback_type}", get(feedbacks::get_by_type))
        .route("/feedbacks/stats", get(feedbacks::get_stats))
        // 客户端日志
        .route("/logs", post(logs::create_log).delete(logs::delete_old_logs))
        .route("/logs/stats", get(logs::get_log_stats))
        .route("/logs/clients/{client_id}", get(logs::get_logs_by_client))
        .route("/logs/clients/{client_id}/sessions", get(logs::get_log_sessions))
        .route("/logs/users/{user_id}", get(logs::get_logs_by_user))
        .route("/logs/modules/{module_name}", get(logs::get_logs_by_module));

    Router::new()
        .nest(API_BASE_PATH, api)
        .fallback(|| async { ApiError::NotFound })
        .with_state(state)
}
