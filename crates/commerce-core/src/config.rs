//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → `COMMERCE__SECTION__KEY` 환경 변수 →
//! 기존 환경 변수 이름(`JWT_SECRET_KEY`, `JWT_REFRESH_TOKEN`, `DATABASE_URL`, `PORT`)
//! 순서로 덮어씁니다.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::{CommerceError, CommerceResult};

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// 데이터베이스 설정.
///
/// `url`이 없으면 인메모리 저장소로 동작합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 문자열
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 역할 가드가 호출자의 역할을 읽어오는 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// `userrole` 요청 헤더 (신뢰 게이트웨이 뒤에서만 안전)
    #[default]
    Header,
    /// 서명된 토큰 페이로드의 `role` 클레임
    Token,
}

/// Argon2 비용 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Access Token 서명 키
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_secret: SecretString,
    /// Refresh Token 서명 키 (access_secret과 달라야 함)
    #[serde(deserialize_with = "deserialize_secret")]
    pub refresh_secret: SecretString,
    /// Access Token 유효 기간 (초)
    pub access_ttl_secs: i64,
    /// Refresh Token 유효 기간 (초)
    pub refresh_ttl_secs: i64,
    /// 역할 출처
    pub role_source: RoleSource,
    /// 비밀번호 해싱 비용
    pub hashing: HashingConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: secret(String::new()),
            refresh_secret: secret(String::new()),
            access_ttl_secs: 60 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            role_source: RoleSource::Header,
            hashing: HashingConfig::default(),
        }
    }
}

impl AuthConfig {
    /// 두 서명 키로 기본 설정 생성.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: secret(access_secret.into()),
            refresh_secret: secret(refresh_secret.into()),
            ..Default::default()
        }
    }

    /// 역할 출처를 설정합니다.
    pub fn with_role_source(mut self, role_source: RoleSource) -> Self {
        self.role_source = role_source;
        self
    }

    /// 해싱 비용을 설정합니다.
    pub fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }

    /// 토큰 유효 기간을 설정합니다.
    pub fn with_ttls(mut self, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        self.access_ttl_secs = access_ttl_secs;
        self.refresh_ttl_secs = refresh_ttl_secs;
        self
    }

    /// Access Token 유효 기간.
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_ttl_secs)
    }

    /// Refresh Token 유효 기간.
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_ttl_secs)
    }

    /// 설정 검증.
    ///
    /// 서명 키가 비어 있거나 두 키가 같으면 에러입니다.
    pub fn validate(&self) -> CommerceResult<()> {
        let access = self.access_secret.expose_secret();
        let refresh = self.refresh_secret.expose_secret();

        if access.is_empty() {
            return Err(CommerceError::Config(
                "auth.access_secret (JWT_SECRET_KEY) must be set".to_string(),
            ));
        }
        if refresh.is_empty() {
            return Err(CommerceError::Config(
                "auth.refresh_secret (JWT_REFRESH_TOKEN) must be set".to_string(),
            ));
        }
        if access == refresh {
            return Err(CommerceError::Config(
                "access and refresh secrets must differ".to_string(),
            ));
        }
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(CommerceError::Config(
                "token ttl must be positive".to_string(),
            ));
        }
        if self.hashing.parallelism == 0
            || self.hashing.iterations == 0
            || self.hashing.memory_kib < 8 * self.hashing.parallelism
        {
            return Err(CommerceError::Config(format!(
                "invalid argon2 parameters: {:?}",
                self.hashing
            )));
        }

        Ok(())
    }

    /// 서명 키 중 하나라도 32바이트 미만인지 확인합니다.
    pub fn has_short_secret(&self) -> bool {
        self.access_secret.expose_secret().len() < 32
            || self.refresh_secret.expose_secret().len() < 32
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into_boxed_str())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(secret)
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드하고 검증합니다.
    ///
    /// 파일이 없으면 건너뜁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CommerceResult<Self> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("COMMERCE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.access_secret", env("JWT_SECRET_KEY"))?
            .set_override_option("auth.refresh_secret", env("JWT_REFRESH_TOKEN"))?
            .set_override_option("database.url", env("DATABASE_URL"))?
            .set_override_option("server.port", env("PORT"))?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CommerceResult<Self> {
        Self::load("config/default.toml")
    }
}
