//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.
//! 생성 후에는 저장소 내부 상태만 변경됩니다.

use std::sync::Arc;

use commerce_core::{AuthConfig, Order, Product, Rating, RoleSource, UserStore};

use crate::auth::password::{CredentialHasher, PasswordError};
use crate::auth::roles::RolePolicy;
use crate::auth::service::AuthService;
use crate::auth::token::TokenService;
use crate::repository::DocumentRepository;
use crate::services::UserService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 인증 서비스 - 로그인, 토큰 갱신, 회원 가입
    pub auth: AuthService,

    /// 사용자 서비스
    pub users: UserService,

    /// Access/Refresh 토큰 서명기
    pub tokens: Arc<TokenService>,

    /// 라우트별 허용 역할
    pub role_policy: Arc<RolePolicy>,

    /// 역할 출처 (헤더 또는 토큰)
    pub role_source: RoleSource,

    /// 자격증명 저장소 (헬스 체크용)
    pub user_store: Arc<dyn UserStore>,

    pub products: DocumentRepository<Product>,
    pub orders: DocumentRepository<Order>,
    pub ratings: DocumentRepository<Rating>,

    /// 데이터베이스 연결 풀 (설정된 경우)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인증 설정과 자격증명 저장소로 상태를 생성합니다.
    pub fn new(config: &AuthConfig, user_store: Arc<dyn UserStore>) -> Result<Self, PasswordError> {
        let hasher = CredentialHasher::new(config.hashing)?;
        let tokens = Arc::new(TokenService::new(config));
        let users = UserService::new(user_store.clone(), hasher.clone());
        let auth = AuthService::new(
            user_store.clone(),
            users.clone(),
            tokens.clone(),
            hasher,
            config.role_source,
        );

        Ok(Self {
            auth,
            users,
            tokens,
            role_policy: Arc::new(RolePolicy::commerce_defaults()),
            role_source: config.role_source,
            user_store,
            products: DocumentRepository::new(),
            orders: DocumentRepository::new(),
            ratings: DocumentRepository::new(),
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 데이터베이스 풀을 설정합니다.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 인메모리 저장소와 낮은 해싱 비용을 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use commerce_core::HashingConfig;

    let config = AuthConfig::new(
        "access-secret-for-unit-tests-0123456789",
        "refresh-secret-for-unit-tests-0123456789",
    )
    .with_hashing(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    });

    AppState::new(&config, Arc::new(crate::repository::MemoryUserStore::new()))
        .expect("test hashing parameters are valid")
}
