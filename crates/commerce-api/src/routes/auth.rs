//! 인증 endpoint.
//!
//! - `POST /auth/register` - 회원 가입 (201)
//! - `POST /auth/login` - 로그인, 사용자 정보와 토큰 페어 반환
//! - `POST /auth/refresh` - `Authorization: Refresh <token>`으로 토큰 재발급

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use commerce_core::UserProfile;
use std::sync::Arc;

use crate::auth::service::{LoginRequest, LoginResponse};
use crate::auth::token::TokenPair;
use crate::auth::RefreshAuth;
use crate::error::ApiResult;
use crate::extract::AppJson;
use crate::services::CreateUserRequest;
use crate::state::AppState;

/// 회원 가입.
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// 로그인.
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    state.auth.login(request).await.map(Json)
}

/// 토큰 갱신.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    RefreshAuth(identity): RefreshAuth,
) -> ApiResult<Json<TokenPair>> {
    state.auth.refresh_token(&identity).map(Json)
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}
