//! HTTP 接口的统一响应格式。
//!
//! 成功时返回 `{code: 0, message: "success", data}`，
//! 失败时返回 HTTP 500 和 `{code: 500, message}`。

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::warn;

use crate::error::LyricsResolverError;

/// 成功响应的消息。
pub const SUCCESS_MESSAGE: &str = "success";

/// 成功响应。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// 业务状态码，成功时为 `0`。
    pub code: i32,
    /// 状态描述。
    pub message: &'static str,
    /// 响应数据，不携带数据的接口省略该字段。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 携带数据的成功响应。
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: SUCCESS_MESSAGE,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 不携带数据的成功响应。
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: SUCCESS_MESSAGE,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 失败响应。
#[derive(Debug)]
pub struct ApiFailure {
    /// 错误描述。
    pub message: String,
}

impl ApiFailure {
    /// 创建失败响应。
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<LyricsResolverError> for ApiFailure {
    fn from(err: LyricsResolverError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(LyricsResolverError::InvalidRequest(rejection.body_text()).to_string())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        warn!("请求失败: {}", self.message);
        let body = Json(json!({
            "code": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            "message": self.message,
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// JSON 请求体提取器，解析失败时以 [`ApiFailure`] 的格式响应。
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let value = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(value, json!({"code": 0, "message": "success", "data": [1, 2]}));
    }

    #[test]
    fn test_ok_envelope_omits_data() {
        let value = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(value, json!({"code": 0, "message": "success"}));
    }

    #[test]
    fn test_failure_status() {
        let response = ApiFailure::from(LyricsResolverError::LyricNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
