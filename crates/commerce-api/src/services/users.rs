//! 사용자 관리 서비스.
//!
//! 생성 시 비밀번호 해싱과 유일성 확인을 담당하며,
//! 수정 시에는 현재 비밀번호 확인이 필요합니다.

use std::sync::Arc;

use commerce_core::{
    normalize_email, Credential, CredentialChanges, NewCredential, Role, UserProfile, UserStore,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::CredentialHasher;
use crate::error::{ApiResult, AppError};
use crate::metrics;

/// 사용자 생성 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "username should not be empty"))]
    pub username: String,
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// 사용자 수정 요청.
///
/// `password`는 현재 비밀번호이며 항상 필요합니다.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub password: String,
    #[serde(default, alias = "newPassword")]
    pub new_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// 사용자 서비스.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// 사용자 생성.
    ///
    /// 유일성은 저장소 삽입 시점에 보장됩니다.
    pub async fn create_user(&self, mut request: CreateUserRequest) -> ApiResult<UserProfile> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        let email = request.email;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already taken".to_string()));
        }

        let password_hash = self.hasher.hash_blocking(request.password).await?;

        let credential = self
            .store
            .insert(NewCredential {
                username: request.username.trim().to_string(),
                email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
                role: request.role,
            })
            .await?;

        metrics::record_user_registered();
        tracing::info!(user_id = %credential.id, role = %credential.role, "User created");

        Ok(credential.into())
    }

    pub async fn list(&self) -> ApiResult<Vec<UserProfile>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<UserProfile> {
        Ok(self.find(id).await?.into())
    }

    /// 사용자 수정.
    ///
    /// 현재 비밀번호가 틀리면 401, 새 비밀번호가 짧으면 422.
    pub async fn update(&self, id: Uuid, request: UpdateUserRequest) -> ApiResult<UserProfile> {
        request.validate()?;
        let credential = self.find(id).await?;

        let matches = self
            .hasher
            .verify_blocking(request.password, credential.password_hash)
            .await;
        if !matches {
            tracing::debug!(user_id = %id, "Current password mismatch on update");
            return Err(AppError::Unauthorized("Password is incorrect".to_string()));
        }

        let password_hash = match request.new_password {
            Some(new_password) => Some(self.hasher.hash_blocking(new_password).await?),
            None => None,
        };

        let changes = CredentialChanges {
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
        };
        if changes.is_empty() {
            return self.get(id).await;
        }

        let updated = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("No user found".to_string()))?;

        tracing::info!(user_id = %id, "User updated");
        Ok(updated.into())
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("No user found".to_string()));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> ApiResult<Credential> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("No user found".to_string()))
    }
}
