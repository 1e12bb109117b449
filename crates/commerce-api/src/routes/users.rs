//! 사용자 관리 endpoint.
//!
//! 모든 라우트는 Access 가드 뒤에 있으며, 생성/삭제는 admin 역할이 필요합니다.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use commerce_core::UserProfile;
use std::sync::Arc;

use super::{parse_id, MessageResponse};
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath};
use crate::services::{CreateUserRequest, UpdateUserRequest};
use crate::state::AppState;

/// 사용자 생성.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// 사용자 목록.
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserProfile>>> {
    state.users.list().await.map(Json)
}

/// 사용자 조회.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> ApiResult<Json<UserProfile>> {
    let id = parse_id(&id, "user")?;
    state.users.get(id).await.map(Json)
}

/// 사용자 수정 (현재 비밀번호 필요).
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    let id = parse_id(&id, "user")?;
    state.users.update(id, request).await.map(Json)
}

/// 사용자 삭제.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, "user")?;
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::state::create_test_state;

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let app = users_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let app = users_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/users/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
