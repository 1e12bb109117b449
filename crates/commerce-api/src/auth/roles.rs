//! 역할 기반 접근 제어.
//!
//! `(메서드, 라우트 패턴) → 허용 역할` 테이블을 선언적으로 관리합니다.
//! 테이블에 없거나 빈 항목은 제한이 없습니다.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use commerce_core::{Role, RoleSource};

use super::guard::AuthenticatedIdentity;
use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;

/// 역할을 담는 요청 헤더 이름.
pub const ROLE_HEADER: &str = "userrole";

/// 라우트별 허용 역할 테이블.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    rules: HashMap<(Method, String), Vec<Role>>,
}

impl RolePolicy {
    /// 제한이 없는 빈 테이블.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 기본 커머스 테이블.
    pub fn commerce_defaults() -> Self {
        use Role::{Admin, Manager};

        Self::empty()
            .require(Method::POST, "/users", &[Admin])
            .require(Method::DELETE, "/users/{id}", &[Admin])
            .require(Method::POST, "/products", &[Admin, Manager])
            .require(Method::PATCH, "/products/{id}", &[Admin, Manager])
            .require(Method::DELETE, "/products/{id}", &[Admin, Manager])
            .require(Method::DELETE, "/orders/{id}", &[Admin])
            .require(Method::DELETE, "/ratings/{id}", &[Admin])
    }

    /// 규칙 추가.
    pub fn require(mut self, method: Method, route: &str, roles: &[Role]) -> Self {
        self.rules
            .insert((method, route.to_string()), roles.to_vec());
        self
    }

    /// 라우트의 허용 역할. 비어 있으면 제한 없음.
    pub fn allowed_roles(&self, method: &Method, route: &str) -> &[Role] {
        self.rules
            .get(&(method.clone(), route.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 주장된 역할로 접근 가능한지 판단합니다.
    ///
    /// 요구 역할이 있으면 역할이 없거나 알 수 없는 경우 거부합니다.
    pub fn is_allowed(&self, method: &Method, route: &str, claimed: Option<Role>) -> bool {
        let required = self.allowed_roles(method, route);
        if required.is_empty() {
            return true;
        }
        claimed.is_some_and(|role| required.contains(&role))
    }
}

/// 요청에서 주장된 역할을 읽습니다.
pub fn claimed_role(
    source: RoleSource,
    headers: &HeaderMap,
    identity: &AuthenticatedIdentity,
) -> Option<Role> {
    match source {
        RoleSource::Header => headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse),
        RoleSource::Token => identity.role,
    }
}

/// 역할 가드 미들웨어.
///
/// Access 가드 이후에 실행되어야 합니다.
pub async fn role_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<AuthenticatedIdentity>()
        .ok_or_else(AppError::unauthorized)?;

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str())
        .unwrap_or_else(|| request.uri().path());

    let claimed = claimed_role(state.role_source, request.headers(), identity);
    if !state.role_policy.is_allowed(request.method(), route, claimed) {
        tracing::debug!(
            method = %request.method(),
            route,
            subject = %identity.subject_id,
            role = ?claimed,
            "Role requirement not met"
        );
        metrics::record_role_denial(route);
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
