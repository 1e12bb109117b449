//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health`, `/health/ready` - 헬스 체크 (공개)
//! - `/auth/register`, `/auth/login` - 공개
//! - `/auth/refresh` - Refresh 가드
//! - `/users`, `/products`, `/orders`, `/ratings` - Access 가드 + 역할 가드

pub mod auth;
pub mod health;
pub mod resources;
pub mod users;

pub use auth::auth_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use resources::{resource_router, Resource};
pub use users::users_router;

use axum::{middleware, Router};
use commerce_core::{Order, Product, Rating};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{access_guard, role_guard};
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

/// 단순 메시지 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 경로 ID 파싱. 잘못된 형식이면 400.
pub(crate) fn parse_id(raw: &str, kind: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} id", kind)))
}

/// 전체 API 라우터 생성.
///
/// 보호된 라우트에는 Access 가드가 먼저, 역할 가드가 그 다음에 적용됩니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .merge(users_router())
        .merge(resource_router::<Product>())
        .merge(resource_router::<Order>())
        .merge(resource_router::<Rating>())
        // 나중에 추가한 레이어가 먼저 실행됨
        .route_layer(middleware::from_fn_with_state(state.clone(), role_guard))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_guard));

    Router::new()
        .merge(health_router())
        .merge(auth_router())
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "user").unwrap(), id);

        let err = parse_id("60f6e3e3e3e3e3e3e3e3e3e3", "user").unwrap_err();
        assert_eq!(err.to_string(), "Invalid user id");
    }
}
