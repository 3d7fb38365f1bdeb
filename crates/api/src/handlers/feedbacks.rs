use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use client_manager_core::FeedbackRequest;
use serde_json::json;

use super::{DateRangeQuery, PageQuery};
use crate::{
    error::ApiResult,
    response::{created, success_with_message},
    routes::AppState,
};

pub async fn create_completion(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_completion(request).await?;
    Ok(created(feedback, "completion feedback created"))
}

/// 批量补全反馈，请求体为 JSON 数组
pub async fn create_completions_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<FeedbackRequest>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(requests) = payload?;
    let count = state.feedback_service.create_completions_batch(requests).await?;
    Ok(created(json!({ "created_count": count }), "completion feedbacks created"))
}

pub async fn create_copy_code(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_copy_code(request).await?;
    Ok(created(feedback, "copy code feedback created"))
}

pub async fn create_evaluate(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_evaluate(request).await?;
    Ok(created(feedback, "evaluate feedback created"))
}

pub async fn create_use_code(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_use_code(request).await?;
    Ok(created(feedback, "use code feedback created"))
}

pub async fn create_issue(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_issue(request).await?;
    Ok(created(feedback, "issue feedback created"))
}

pub async fn create_error(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let feedback = state.feedback_service.create_error(request).await?;
    Ok(created(feedback, "error feedback created"))
}

/// 会话下的全部反馈
pub async fn get_by_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let feedbacks = state.feedback_service.get_by_conversation(&conversation_id).await?;
    Ok(success_with_message(feedbacks, "feedbacks retrieved"))
}

pub async fn get_by_type(
    State(state): State<AppState>,
    Path(feedback_type): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .feedback_service
        .get_by_type(&feedback_type, query.to_page_request())
        .await?;
    Ok(success_with_message(page, "feedbacks retrieved"))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let stats = state
        .feedback_service
        .get_stats(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;
    Ok(success_with_message(stats, "feedback stats retrieved"))
}
