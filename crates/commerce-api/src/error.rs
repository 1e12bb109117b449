//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트는 [`AppError`]를 반환하며, 응답 본문은 항상
//! [`ApiErrorResponse`] 형식입니다.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use commerce_core::{StoreError, UniqueField};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Email is already taken",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHORIZED", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 추가.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러/서비스 에러.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Forbidden resource")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 인증 실패 (원인을 드러내지 않는 일반 메시지).
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Unauthorized".to_string())
    }

    /// 로그인 실패 (이메일 없음/비밀번호 불일치 공통).
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Invalid credentials".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                ApiErrorResponse::new("INTERNAL_ERROR", "Internal server error")
            }
            AppError::Validation { message, details } => {
                let body = ApiErrorResponse::new("VALIDATION_ERROR", message);
                match details {
                    Some(details) => body.with_details(details),
                    None => body,
                }
            }
            other => ApiErrorResponse::new(other.code(), other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => AppError::Conflict(match field {
                UniqueField::Email => "Email is already taken".to_string(),
                UniqueField::Username => "Username is already taken".to_string(),
            }),
            StoreError::Backend(message) => AppError::Internal(message),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(e) => AppError::Internal(format!("token encoding: {}", e)),
            TokenError::Expired | TokenError::Invalid(_) => AppError::unauthorized(),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => AppError::validation(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: errors.to_string(),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // 누락 필드, 타입 불일치, 알 수 없는 enum 값
            JsonRejection::JsonDataError(e) => AppError::validation(e.body_text()),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_conflict_response() {
        let err: AppError = StoreError::Duplicate {
            field: UniqueField::Email,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["code"], "CONFLICT");
        assert_eq!(json["message"], "Email is already taken");
        assert!(json["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response = AppError::Internal("db password=hunter2".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn test_token_errors_collapse_to_unauthorized() {
        let expired: AppError = TokenError::Expired.into();
        let invalid: AppError = TokenError::Invalid("signature").into();

        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(expired.to_string(), "Unauthorized");
    }

    #[test]
    fn test_short_password_is_validation_error() {
        let err: AppError = PasswordError::TooShort { min: 6 }.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
