//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.
//! 비용 파라미터는 [`HashingConfig`]에서 가져옵니다.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use commerce_core::HashingConfig;

/// 최소 비밀번호 길이 (문자 수).
pub const MIN_PASSWORD_LEN: usize = 6;

const DUMMY_PASSWORD: &str = "timing-equalizer-password";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 Argon2 파라미터: {0}")]
    InvalidParams(String),
}

/// Argon2id 해셔.
///
/// 복제 비용이 낮아 `spawn_blocking` 클로저로 옮길 수 있습니다.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// 존재하지 않는 이메일 로그인 시 검증할 해시
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// 설정된 비용으로 해셔 생성.
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;

        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// 비밀번호 해싱.
    ///
    /// 호출마다 새 솔트를 생성하며 PHC 형식 문자열을 반환합니다.
    /// 최소 길이 미만이면 해싱하지 않고 `TooShort`.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasswordError::TooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        hash_with(&self.argon2, password)
    }

    /// 비밀번호 검증.
    ///
    /// 저장된 해시를 파싱할 수 없으면 `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("Stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// 더미 해시에 대해 검증을 수행합니다. 결과는 항상 버려집니다.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }

    /// 블로킹 풀에서 해싱.
    pub async fn hash_blocking(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                PasswordError::HashingFailed
            })?
    }

    /// 블로킹 풀에서 검증.
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = self.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// 블로킹 풀에서 더미 검증.
    pub async fn verify_dummy_blocking(&self, password: String) {
        let hasher = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await {
            tracing::error!(error = %e, "Dummy verification task failed");
        }
    }
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret123", &hash));
        assert!(!hasher.verify("secret124", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("Password1").unwrap();
        let hash2 = hasher.hash("Password1").unwrap();

        // 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("Password1", &hash1));
        assert!(hasher.verify("Password1", &hash2));
    }

    #[test]
    fn test_short_password_rejected() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.hash("12345"),
            Err(PasswordError::TooShort { min: 6 })
        ));
        assert!(hasher.hash("123456").is_ok());
        // 문자 수 기준
        assert!(hasher.hash("한글비밀번호").is_ok());
    }

    #[test]
    fn test_invalid_hash_format_is_mismatch() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("password", "not-a-valid-hash"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = CredentialHasher::new(HashingConfig {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher = fast_hasher();
        let hash = hasher.hash_blocking("secret123".to_string()).await.unwrap();

        assert!(
            hasher
                .verify_blocking("secret123".to_string(), hash.clone())
                .await
        );
        assert!(!hasher.verify_blocking("nope-nope".to_string(), hash).await);
        hasher.verify_dummy_blocking("whatever".to_string()).await;
    }
}
