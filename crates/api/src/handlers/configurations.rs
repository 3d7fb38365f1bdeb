use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};
use client_manager_core::{CreateConfigurationRequest, UpdateConfigurationRequest};
use serde::Deserialize;

use super::PageQuery;
use crate::{
    error::ApiResult,
    response::{created, success_with_message},
    routes::AppState,
};

/// 配置项列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListConfigurationsQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    pub search: Option<String>,
}

/// 分页列出配置项
pub async fn list_configurations(
    State(state): State<AppState>,
    Query(query): Query<ListConfigurationsQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .configuration_service
        .list_configurations(query.page.to_page_request(), query.search.as_deref())
        .await?;

    Ok(success_with_message(page, "configurations retrieved"))
}

/// 命名空间下的全部配置项
pub async fn get_namespace_configurations(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let entries = state
        .configuration_service
        .get_configurations_by_namespace(&namespace)
        .await?;

    Ok(success_with_message(entries, "configurations retrieved"))
}

/// 按复合键读取配置项
pub async fn get_configuration(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let entry = state.configuration_service.get_configuration(&namespace, &key).await?;
    Ok(success_with_message(entry, "configuration retrieved"))
}

pub async fn create_configuration(
    State(state): State<AppState>,
    payload: Result<Json<CreateConfigurationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let entry = state.configuration_service.create_configuration(request).await?;
    Ok(created(entry, "configuration created"))
}

pub async fn update_configuration(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateConfigurationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let entry = state.configuration_service.update_configuration(id, request).await?;
    Ok(success_with_message(entry, "configuration updated"))
}

pub async fn delete_configuration(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    state.configuration_service.delete_configuration(id).await?;
    Ok(success_with_message(serde_json::json!({ "id": id }), "configuration deleted"))
}
