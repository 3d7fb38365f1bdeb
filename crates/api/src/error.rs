use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use client_manager_core::ManagerError;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Manager(#[from] ManagerError),

    #[error("请求体无效: {0}")]
    InvalidBody(String),

    #[error("查询参数无效: {0}")]
    InvalidQuery(String),

    #[error("路径参数无效: {0}")]
    InvalidPath(String),

    #[error("未找到资源")]
    NotFound,
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    fn new(code: &str, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Manager(ManagerError::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("validation.error", message.clone(), Some(field.clone())),
            ),
            ApiError::Manager(err @ ManagerError::ConfigurationNotFound { .. })
            | ApiError::Manager(err @ ManagerError::ConfigurationIdNotFound { .. }) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("notfound.error", err.to_string(), None),
            ),
            ApiError::Manager(ManagerError::Conflict(message)) => (
                StatusCode::CONFLICT,
                ErrorBody::new("conflict.error", message.clone(), None),
            ),
            ApiError::Manager(err) => {
                error!("请求处理失败: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("internal.error", "internal server error", None),
                )
            }
            ApiError::InvalidBody(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("validation.error", message.clone(), Some("body".to_string())),
            ),
            ApiError::InvalidQuery(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("validation.error", message.clone(), Some("query".to_string())),
            ),
            ApiError::InvalidPath(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("validation.error", message.clone(), Some("path".to_string())),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("notfound.error", "resource not found", None),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400_with_field() {
        let err = ApiError::from(ManagerError::validation("namespace", "namespace 不能为空"));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "validation.error");
        assert_eq!(body.field.as_deref(), Some("namespace"));
    }

    #[test]
    fn test_not_found_and_conflict() {
        let (status, body) = ApiError::from(ManagerError::ConfigurationIdNotFound { id: 3 }).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "notfound.error");

        let (status, body) =
            ApiError::from(ManagerError::Conflict("configuration already exists".to_string())).status_and_body();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.message, "configuration already exists");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (status, body) = ApiError::from(ManagerError::database_error("connection reset")).status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "internal.error");
        assert!(!body.message.contains("connection reset"));
        assert!(body.field.is_none());
    }
}
