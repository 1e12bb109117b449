//! 사용자 자격증명 및 역할.
//!
//! 저장된 자격증명(`Credential`)은 비밀번호 해시를 포함하므로 직렬화되지 않습니다.
//! 외부로 노출되는 형태는 항상 [`UserProfile`] 프로젝션입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자
    Admin,
    /// 매니저
    Manager,
}

impl Role {
    /// 문자열에서 역할 파싱.
    ///
    /// 소문자 식별자와 정확히 일치해야 합니다. 그 외 값은 `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    /// 소문자 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 저장된 사용자 자격증명.
#[derive(Clone)]
pub struct Credential {
    pub id: Uuid,
    pub username: String,
    /// 정규화된(소문자) 이메일
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// PHC 형식 해시 (평문이 아님)
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl Credential {
    /// 응답용 프로젝션으로 변환.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// 새 자격증명 입력 (이미 해싱된 비밀번호).
#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// 자격증명 부분 수정. `None` 필드는 유지됩니다.
#[derive(Clone, Default)]
pub struct CredentialChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
}

impl CredentialChanges {
    /// 변경 사항이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.password_hash.is_none()
    }

    /// 자격증명에 변경 사항 적용.
    pub fn apply_to(self, credential: &mut Credential, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            credential.first_name = Some(first_name);
        }
        if let Some(last_name) = self.last_name {
            credential.last_name = Some(last_name);
        }
        if let Some(hash) = self.password_hash {
            credential.password_hash = hash;
        }
        credential.updated_at = now;
    }
}

/// 사용자 응답 프로젝션.
///
/// 비밀번호 해시 필드가 존재하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Credential> for UserProfile {
    fn from(c: &Credential) -> Self {
        Self {
            id: c.id,
            username: c.username.clone(),
            email: c.email.clone(),
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            role: c.role,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<Credential> for UserProfile {
    fn from(c: Credential) -> Self {
        Self {
            id: c.id,
            username: c.username,
            email: c.email,
            first_name: c.first_name,
            last_name: c.last_name,
            role: c.role,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// 이메일 정규화 (앞뒤 공백 제거, 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
