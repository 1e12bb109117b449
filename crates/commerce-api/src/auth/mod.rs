//! 인증 및 권한 관리 모듈.
//!
//! JWT 기반 인증과 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 흐름
//!
//! 요청 → Access/Refresh 가드 (인증) → 역할 가드 (인가) → 핸들러

pub mod guard;
pub mod password;
pub mod roles;
pub mod service;
pub mod token;

pub use guard::{access_guard, Authenticated, AuthenticatedIdentity, RefreshAuth};
pub use password::{CredentialHasher, PasswordError, MIN_PASSWORD_LEN};
pub use roles::{role_guard, RolePolicy, ROLE_HEADER};
pub use service::{AuthService, LoginRequest, LoginResponse};
pub use token::{
    issue_token, verify_token, Claims, TokenError, TokenKind, TokenPair, TokenPayload,
    TokenService, TokenSigner,
};
