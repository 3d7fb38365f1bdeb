use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use client_manager_core::CreateLogRequest;
use serde::Deserialize;
use serde_json::json;

use super::{DateRangeQuery, PageQuery};
use crate::{
    error::ApiResult,
    response::{created, success_with_message},
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PurgeQuery {
    pub before_date: Option<String>,
}

/// 上报一条客户端日志
pub async fn create_log(
    State(state): State<AppState>,
    payload: Result<Json<CreateLogRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let log = state.log_service.create_log(request).await?;
    Ok(created(log, "log created"))
}

/// 清理早于 before_date 的日志
pub async fn delete_old_logs(
    State(state): State<AppState>,
    Query(query): Query<PurgeQuery>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.log_service.delete_old_logs(query.before_date.as_deref()).await?;
    Ok(success_with_message(json!({ "deleted_count": deleted }), "logs deleted"))
}

pub async fn get_log_stats(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let stats = state
        .log_service
        .get_log_stats(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;
    Ok(success_with_message(stats, "log stats retrieved"))
}

pub async fn get_logs_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .log_service
        .get_logs_by_client(&client_id, query.to_page_request())
        .await?;
    Ok(success_with_message(page, "logs retrieved"))
}

/// 客户端的会话起止记录
pub async fn get_log_sessions(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .log_service
        .get_log_sessions(&client_id, query.to_page_request())
        .await?;
    Ok(success_with_message(page, "log sessions retrieved"))
}

pub async fn get_logs_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .log_service
        .get_logs_by_user(&user_id, query.to_page_request())
        .await?;
    Ok(success_with_message(page, "logs retrieved"))
}

pub async fn get_logs_by_module(
    State(state): State<AppState>,
    Path(module_name): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .log_service
        .get_logs_by_module(&module_name, query.to_page_request())
        .await?;
    Ok(success_with_message(page, "logs retrieved"))
}
