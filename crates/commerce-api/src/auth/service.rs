//! 인증 서비스.
//!
//! 로그인, 토큰 갱신, 회원 가입을 담당합니다.

use std::sync::Arc;

use commerce_core::{auth_span, normalize_email, Credential, RoleSource, UserProfile, UserStore};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use validator::Validate;

use super::guard::AuthenticatedIdentity;
use super::password::CredentialHasher;
use super::token::{TokenPair, TokenPayload, TokenService};
use crate::error::{ApiResult, AppError};
use crate::metrics;
use crate::services::{CreateUserRequest, UserService};

/// 로그인 요청.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub backend_tokens: TokenPair,
}

/// 인증 서비스.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    users: UserService,
    tokens: Arc<TokenService>,
    hasher: CredentialHasher,
    role_source: RoleSource,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        users: UserService,
        tokens: Arc<TokenService>,
        hasher: CredentialHasher,
        role_source: RoleSource,
    ) -> Self {
        Self {
            store,
            users,
            tokens,
            hasher,
            role_source,
        }
    }

    /// 로그인.
    ///
    /// 이메일이 없거나 비밀번호가 틀리면 같은 에러를 반환합니다.
    pub async fn login(&self, mut request: LoginRequest) -> ApiResult<LoginResponse> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let credential = match self.store.find_by_email(&request.email).await? {
            Some(credential) => credential,
            None => {
                self.hasher.verify_dummy_blocking(request.password).await;
                tracing::debug!("Login failed: unknown email");
                metrics::record_login_attempt("invalid_credentials");
                return Err(AppError::invalid_credentials());
            }
        };

        let span = auth_span!("login", credential.id);
        async {
            let valid = self
                .hasher
                .verify_blocking(request.password, credential.password_hash.clone())
                .await;
            if !valid {
                tracing::debug!("Login failed: password mismatch");
                metrics::record_login_attempt("invalid_credentials");
                return Err(AppError::invalid_credentials());
            }

            let backend_tokens = self
                .tokens
                .issue_pair(&self.payload_for(&credential))
                .map_err(AppError::from)?;
            metrics::record_login_attempt("success");
            tracing::info!("User logged in");

            Ok(LoginResponse {
                user: credential.to_profile(),
                backend_tokens,
            })
        }
        .instrument(span)
        .await
    }

    /// 토큰 갱신.
    ///
    /// 저장소를 조회하지 않으며 기존 Refresh Token은 만료 전까지 유효합니다.
    pub fn refresh_token(&self, identity: &AuthenticatedIdentity) -> ApiResult<TokenPair> {
        let pair = self.tokens.issue_pair(&identity.payload())?;
        tracing::debug!(subject = %identity.subject_id, "Token pair re-issued");
        Ok(pair)
    }

    /// 회원 가입.
    pub async fn register(&self, request: CreateUserRequest) -> ApiResult<UserProfile> {
        self.users.create_user(request).await
    }

    fn payload_for(&self, credential: &Credential) -> TokenPayload {
        TokenPayload {
            subject_id: credential.id,
            username: credential.username.clone(),
            role: match self.role_source {
                RoleSource::Token => Some(credential.role),
                RoleSource::Header => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenKind;
    use crate::repository::MemoryUserStore;
    use commerce_core::{AuthConfig, HashingConfig, Role};

    fn build(role_source: RoleSource) -> (AuthService, Arc<TokenService>) {
        let config = AuthConfig::new(
            "access-secret-for-service-tests-0123456789",
            "refresh-secret-for-service-tests-0123456789",
        )
        .with_role_source(role_source);
        let hasher = CredentialHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let tokens = Arc::new(TokenService::new(&config));
        let users = UserService::new(store.clone(), hasher.clone());

        (
            AuthService::new(store, users, tokens.clone(), hasher, role_source),
            tokens,
        )
    }

    fn register_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            password: "secret123".to_string(),
            role: Role::Admin,
            first_name: None,
            last_name: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_subject_matches_stored_id() {
        let (service, tokens) = build(RoleSource::Header);
        let profile = service.register(register_request()).await.unwrap();

        let response = service
            .login(login_request("  John@Example.com ", "secret123"))
            .await
            .unwrap();
        assert_eq!(response.user.id, profile.id);

        let payload = tokens
            .verify(&response.backend_tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(payload.subject_id, profile.id);
        assert_eq!(payload.role, None);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = build(RoleSource::Header);
        service.register(register_request()).await.unwrap();

        let wrong_password = service
            .login(login_request("john@example.com", "secret124"))
            .await
            .unwrap_err();
        let unknown_email = service
            .login(login_request("nobody@example.com", "secret123"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.status(), unknown_email.status());
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_token_role_source_embeds_role() {
        let (service, tokens) = build(RoleSource::Token);
        service.register(register_request()).await.unwrap();

        let response = service
            .login(login_request("john@example.com", "secret123"))
            .await
            .unwrap();
        let payload = tokens
            .verify(&response.backend_tokens.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(payload.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_refresh_keeps_payload() {
        let (service, tokens) = build(RoleSource::Header);
        let profile = service.register(register_request()).await.unwrap();
        let identity = AuthenticatedIdentity {
            subject_id: profile.id,
            username: profile.username.clone(),
            role: None,
        };

        let pair = service.refresh_token(&identity).unwrap();
        let payload = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(payload, identity.payload());
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let debug = format!("{:?}", login_request("a@x.com", "hunter22"));
        assert!(!debug.contains("hunter22"));
    }
}
