//! API 错误类型定义
//!
//! 将服务层错误映射为 HTTP 状态码与统一响应体

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use voucher_core::VoucherError;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] VoucherError),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Service(err) => match err {
                VoucherError::Validation(_)
                | VoucherError::Conflict(_)
                | VoucherError::Reference { .. }
                | VoucherError::InsufficientStock { .. }
                | VoucherError::InsufficientPoints { .. } => StatusCode::BAD_REQUEST,
                VoucherError::NotFound { .. } => StatusCode::NOT_FOUND,
                VoucherError::Database(_) | VoucherError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Service(err) => err.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Service(err) if !err.is_business_error() => {
                tracing::error!(error = %err, code = err.error_code(), "请求处理失败");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 查询参数缺失或无法解析
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use voucher_core::EntityKind;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode, &str)> = vec![
            (
                ApiError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                VoucherError::not_found(EntityKind::Customer, 1).into(),
                StatusCode::NOT_FOUND,
                "CUSTOMER_NOT_FOUND",
            ),
            (
                VoucherError::Conflict("dup".to_string()).into(),
                StatusCode::BAD_REQUEST,
                "CONFLICT",
            ),
            (
                VoucherError::reference(EntityKind::Brand, 999).into(),
                StatusCode::BAD_REQUEST,
                "REFERENCE_NOT_FOUND",
            ),
            (
                VoucherError::InsufficientStock {
                    voucher_name: "V1".to_string(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_STOCK",
            ),
            (
                VoucherError::InsufficientPoints { have: 1, need: 2 }.into(),
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_POINTS",
            ),
            (
                VoucherError::Database(sqlx::Error::PoolClosed).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
            (
                VoucherError::Internal("x".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{}", code);
            assert_eq!(err.error_code(), code);
        }
    }

    #[tokio::test]
    async fn test_system_error_body_hides_detail() {
        let err: ApiError = VoucherError::Internal("connection reset by peer".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("connection reset"));
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_business_error_body_keeps_message() {
        let err: ApiError = VoucherError::InsufficientPoints {
            have: 40,
            need: 60,
        }
        .into();
        let response = err.into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "INSUFFICIENT_POINTS");
        assert!(json["message"].as_str().unwrap().contains("60"));
    }
}
