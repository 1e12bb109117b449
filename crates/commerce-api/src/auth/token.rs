//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 생성/검증 로직.
//! 두 종류의 토큰은 서로 다른 비밀 키로 서명되며, `token_type` 클레임으로도 구분됩니다.

use chrono::{DateTime, Duration, Utc};
use commerce_core::{AuthConfig, Role};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Authorization 헤더에서 요구하는 스킴.
    pub fn scheme(&self) -> &'static str {
        match self {
            TokenKind::Access => "Bearer",
            TokenKind::Refresh => "Refresh",
        }
    }

    /// 소문자 식별자 (로그/메트릭 라벨용).
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// 토큰에 담기는 주체 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    /// 사용자 ID
    pub subject_id: Uuid,
    /// 사용자 이름
    pub username: String,
    /// 역할 (역할 출처가 token일 때만 포함)
    pub role: Option<Role>,
}

/// JWT 페이로드 (wire 형식).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 사용자 이름
    pub username: String,
    /// 사용자 역할
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// 토큰 종류
    pub token_type: TokenKind,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    fn new(payload: &TokenPayload, kind: TokenKind, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            sub: payload.subject_id.to_string(),
            username: payload.username.clone(),
            role: payload.role,
            token_type: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰: {0}")]
    Invalid(&'static str),
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

fn encode_claims(claims: &Claims, key: &EncodingKey) -> Result<String, TokenError> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, key)?)
}

fn decode_claims(
    token: &str,
    kind: TokenKind,
    key: &DecodingKey,
    now: DateTime<Utc>,
) -> Result<TokenPayload, TokenError> {
    let data = decode::<Claims>(token, key, &validation()).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::Invalid("signature"),
        ErrorKind::InvalidAlgorithm => TokenError::Invalid("algorithm"),
        _ => TokenError::Invalid("malformed"),
    })?;
    let claims = data.claims;

    if claims.exp <= now.timestamp() {
        return Err(TokenError::Expired);
    }
    if claims.token_type != kind {
        return Err(TokenError::Invalid("token type"));
    }
    let subject_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid("subject"))?;

    Ok(TokenPayload {
        subject_id,
        username: claims.username,
        role: claims.role,
    })
}

/// 토큰 발급.
///
/// `iat = now`, `exp = now + ttl`로 HS256 서명한 JWT를 반환합니다.
pub fn issue_token(
    payload: &TokenPayload,
    kind: TokenKind,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = Claims::new(payload, kind, ttl, now);
    encode_claims(&claims, &EncodingKey::from_secret(secret.as_bytes()))
}

/// 토큰 검증.
///
/// 서명, 알고리즘, 만료(유예 없음), 토큰 종류를 확인합니다.
pub fn verify_token(token: &str, kind: TokenKind, secret: &str) -> Result<TokenPayload, TokenError> {
    decode_claims(
        token,
        kind,
        &DecodingKey::from_secret(secret.as_bytes()),
        Utc::now(),
    )
}

/// 한 종류의 토큰을 위한 서명기.
pub struct TokenSigner {
    kind: TokenKind,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("kind", &self.kind)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(kind: TokenKind, secret: &[u8], ttl: Duration) -> Self {
        Self {
            kind,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// 지정 시각 기준으로 발급.
    pub fn issue_at(&self, payload: &TokenPayload, now: DateTime<Utc>) -> Result<String, TokenError> {
        encode_claims(&Claims::new(payload, self.kind, self.ttl, now), &self.encoding)
    }

    pub fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.issue_at(payload, Utc::now())
    }

    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        decode_claims(token, self.kind, &self.decoding, Utc::now())
    }
}

/// Access/Refresh 서명기 묶음.
#[derive(Debug)]
pub struct TokenService {
    access: TokenSigner,
    refresh: TokenSigner,
}

impl TokenService {
    /// 인증 설정에서 두 서명기를 생성합니다.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: TokenSigner::new(
                TokenKind::Access,
                config.access_secret.expose_secret().as_bytes(),
                config.access_ttl(),
            ),
            refresh: TokenSigner::new(
                TokenKind::Refresh,
                config.refresh_secret.expose_secret().as_bytes(),
                config.refresh_ttl(),
            ),
        }
    }

    pub fn signer(&self, kind: TokenKind) -> &TokenSigner {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn issue(&self, payload: &TokenPayload, kind: TokenKind) -> Result<String, TokenError> {
        self.signer(kind).issue(payload)
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, TokenError> {
        self.signer(kind).verify(token)
    }

    /// 같은 페이로드로 Access/Refresh 토큰을 함께 발급합니다.
    pub fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.access.issue(payload)?,
            refresh_token: self.refresh.issue(payload)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS: &str = "access-secret-for-token-tests-0123456789";
    const REFRESH: &str = "refresh-secret-for-token-tests-0123456789";

    fn payload() -> TokenPayload {
        TokenPayload {
            subject_id: Uuid::new_v4(),
            username: "johndoe".to_string(),
            role: None,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let payload = payload();
        let token = issue_token(
            &payload,
            TokenKind::Access,
            ACCESS,
            Duration::hours(1),
            Utc::now(),
        )
        .unwrap();

        let verified = verify_token(&token, TokenKind::Access, ACCESS).unwrap();
        assert_eq!(verified, payload);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(
            &payload(),
            TokenKind::Access,
            ACCESS,
            Duration::hours(1),
            Utc::now(),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, TokenKind::Access, REFRESH),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token =
            issue_token(&payload(), TokenKind::Access, ACCESS, Duration::hours(1), issued).unwrap();

        assert!(matches!(
            verify_token(&token, TokenKind::Access, ACCESS),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let token =
            issue_token(&payload(), TokenKind::Access, ACCESS, Duration::zero(), Utc::now())
                .unwrap();

        assert!(matches!(
            verify_token(&token, TokenKind::Access, ACCESS),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_token_type_mismatch_rejected() {
        // 같은 키여도 종류가 다르면 거부
        let token = issue_token(
            &payload(),
            TokenKind::Refresh,
            ACCESS,
            Duration::hours(1),
            Utc::now(),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, TokenKind::Access, ACCESS),
            Err(TokenError::Invalid("token type"))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_token("not.a.jwt", TokenKind::Access, ACCESS).is_err());
        assert!(verify_token("", TokenKind::Access, ACCESS).is_err());
    }

    #[test]
    fn test_service_pair_uses_separate_secrets() {
        let service = TokenService::new(&AuthConfig::new(ACCESS, REFRESH));
        let payload = TokenPayload {
            role: Some(Role::Manager),
            ..payload()
        };
        let pair = service.issue_pair(&payload).unwrap();

        assert_eq!(
            service.verify(&pair.access_token, TokenKind::Access).unwrap(),
            payload
        );
        assert_eq!(
            service.verify(&pair.refresh_token, TokenKind::Refresh).unwrap(),
            payload
        );
        assert!(service.verify(&pair.access_token, TokenKind::Refresh).is_err());
        assert!(service.verify(&pair.refresh_token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_token_pair_wire_format() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!(TokenKind::Access.scheme(), "Bearer");
        assert_eq!(TokenKind::Refresh.scheme(), "Refresh");
    }
}
