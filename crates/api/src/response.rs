use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// 成功响应的固定 code
pub const SUCCESS_CODE: &str = "success";

/// 统一的成功响应包装
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, "ok")
    }

    pub fn success_with_message<M: Into<String>>(data: T, message: M) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

pub fn success<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

pub fn success_with_message<T: Serialize, M: Into<String>>(data: T, message: M) -> ApiResponse<T> {
    ApiResponse::success_with_message(data, message)
}

/// 201 Created
pub fn created<T: Serialize, M: Into<String>>(data: T, message: M) -> impl IntoResponse {
    (StatusCode::CREATED, ApiResponse::success_with_message(data, message))
}
