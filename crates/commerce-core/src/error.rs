//! 커머스 시스템의 에러 타입.
//!
//! 저장소 계층과 설정 계층에서 발생하는 에러를 정의합니다.
//! HTTP 응답으로의 변환은 `commerce-api`가 담당합니다.

use thiserror::Error;

/// 유일성이 보장되어야 하는 사용자 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// 이메일 주소
    Email,
    /// 사용자 이름
    Username,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
        };
        write!(f, "{}", s)
    }
}

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 유일성 제약 위반 (저장소 수준에서 검출)
    #[error("{field} is already taken")]
    Duplicate { field: UniqueField },

    /// 백엔드(DB 등) 에러
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

/// 핵심 커머스 에러.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 저장소 에러
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<config::ConfigError> for CommerceError {
    fn from(err: config::ConfigError) -> Self {
        CommerceError::Config(err.to_string())
    }
}

/// 커머스 작업을 위한 Result 타입.
pub type CommerceResult<T> = Result<T, CommerceError>;
