//! 인증 가드.
//!
//! Access 가드(`Bearer`)와 Refresh 가드(`Refresh`)는 같은 절차를 따릅니다:
//! Authorization 헤더 추출 → 스킴 확인 → 해당 서명기로 검증 → 요청 확장에 주체 저장.
//! 실패 원인은 debug 레벨로만 기록하고, 응답은 항상 일반적인 401입니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use commerce_core::Role;
use uuid::Uuid;

use super::token::{TokenKind, TokenPayload, TokenService};
use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;

/// 검증된 토큰에서 만든 요청 단위 주체 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub subject_id: Uuid,
    pub username: String,
    /// 토큰에 역할이 포함된 경우에만 존재
    pub role: Option<Role>,
}

impl AuthenticatedIdentity {
    /// 재발급용 페이로드.
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            subject_id: self.subject_id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl From<TokenPayload> for AuthenticatedIdentity {
    fn from(payload: TokenPayload) -> Self {
        Self {
            subject_id: payload.subject_id,
            username: payload.username,
            role: payload.role,
        }
    }
}

/// Authorization 헤더에서 토큰 추출.
///
/// 값은 정확히 `<scheme> <token>` 형식이어야 합니다.
pub fn extract_token<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("missing authorization header")?
        .to_str()
        .map_err(|_| "non-ascii authorization header")?;

    let (found, token) = value.split_once(' ').ok_or("malformed authorization header")?;
    if found != scheme {
        return Err("scheme mismatch");
    }
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err("malformed token");
    }
    Ok(token)
}

/// 헤더를 검증하여 주체를 반환합니다.
pub fn authenticate(
    tokens: &TokenService,
    headers: &HeaderMap,
    kind: TokenKind,
) -> Result<AuthenticatedIdentity, AppError> {
    let result = extract_token(headers, kind.scheme())
        .and_then(|token| {
            tokens.verify(token, kind).map_err(|e| {
                tracing::debug!(guard = kind.as_str(), error = %e, "Token verification failed");
                "verification failed"
            })
        })
        .map(AuthenticatedIdentity::from);

    result.map_err(|reason| {
        tracing::debug!(guard = kind.as_str(), reason, "Request rejected by guard");
        metrics::record_guard_rejection(kind.as_str());
        AppError::unauthorized()
    })
}

/// Access 가드 미들웨어.
///
/// 성공 시 [`AuthenticatedIdentity`]를 요청 확장에 저장합니다.
pub async fn access_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state.tokens, request.headers(), TokenKind::Access)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Access 가드가 저장한 주체를 꺼내는 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn handler(Authenticated(identity): Authenticated) -> String {
///     identity.username
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(AppError::unauthorized)
    }
}

/// Refresh 가드 추출기 (`Authorization: Refresh <token>`).
#[derive(Debug, Clone)]
pub struct RefreshAuth(pub AuthenticatedIdentity);

impl FromRequestParts<Arc<AppState>> for RefreshAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&state.tokens, &parts.headers, TokenKind::Refresh).map(RefreshAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use commerce_core::AuthConfig;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::new(
            "access-secret-for-guard-tests-0123456789",
            "refresh-secret-for-guard-tests-0123456789",
        ))
    }

    #[test]
    fn test_extract_token_requires_exact_scheme() {
        assert_eq!(extract_token(&headers("Bearer abc"), "Bearer"), Ok("abc"));
        assert!(extract_token(&headers("bearer abc"), "Bearer").is_err());
        assert!(extract_token(&headers("Refresh abc"), "Bearer").is_err());
        assert!(extract_token(&headers("Bearer"), "Bearer").is_err());
        assert!(extract_token(&headers("Bearer "), "Bearer").is_err());
        assert!(extract_token(&headers("Bearer a b"), "Bearer").is_err());
        assert!(extract_token(&HeaderMap::new(), "Bearer").is_err());
    }

    #[test]
    fn test_authenticate_with_matching_scheme() {
        let tokens = service();
        let payload = TokenPayload {
            subject_id: Uuid::new_v4(),
            username: "johndoe".to_string(),
            role: None,
        };
        let pair = tokens.issue_pair(&payload).unwrap();

        let identity = authenticate(
            &tokens,
            &headers(&format!("Bearer {}", pair.access_token)),
            TokenKind::Access,
        )
        .unwrap();
        assert_eq!(identity.subject_id, payload.subject_id);

        let identity = authenticate(
            &tokens,
            &headers(&format!("Refresh {}", pair.refresh_token)),
            TokenKind::Refresh,
        )
        .unwrap();
        assert_eq!(identity.payload(), payload);
    }

    #[test]
    fn test_authenticate_rejects_wrong_scheme_even_with_valid_token() {
        let tokens = service();
        let payload = TokenPayload {
            subject_id: Uuid::new_v4(),
            username: "johndoe".to_string(),
            role: None,
        };
        let pair = tokens.issue_pair(&payload).unwrap();

        let err = authenticate(
            &tokens,
            &headers(&format!("Refresh {}", pair.access_token)),
            TokenKind::Access,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");

        assert!(authenticate(
            &tokens,
            &headers(&format!("Bearer {}", pair.refresh_token)),
            TokenKind::Refresh,
        )
        .is_err());
    }
}
