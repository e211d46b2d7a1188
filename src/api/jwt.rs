use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ACCESS_TOKEN_TYPE: &str = "access";

/// Access Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// 新签发的令牌
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_minutes,
        }
    }

    /// 从 `[auth]` 配置创建；secret 为空时生成随机值（重启后旧令牌失效）
    pub fn from_config(config: &crate::config::AuthConfig) -> Self {
        let secret = if config.jwt_secret.is_empty() {
            tracing::warn!("JWT secret not configured, generating a random one for this process");
            generate_secret()
        } else {
            config.jwt_secret.clone()
        };
        Self::new(&secret, config.token_minutes)
    }

    /// 令牌有效期（秒）
    pub fn expires_in(&self) -> i64 {
        self.token_minutes as i64 * 60
    }

    /// Generate Access Token for a user
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.token_minutes as i64);
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            token,
            jti: claims.jti,
            issued_at: Utc.timestamp_opt(claims.iat, 0).single().unwrap_or(now),
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(expires_at),
        })
    }

    /// Validate Access Token
    pub fn validate(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE || token_data.claims.user_id().is_none()
        {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}

/// 生成 32 字节随机 secret（hex 编码）
pub fn generate_secret() -> String {
    rand::random::<[u8; 32]>()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 15)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let issued = service.issue(42).unwrap();
        let claims = service.validate(&issued.token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(service.expires_in(), 900);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let service = create_test_service();
        let a = service.issue(1).unwrap();
        let b = service.issue(1).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_test_service().issue(1).unwrap().token;
        let other = JwtService::new("different_secret_key_32_bytes!!", 15);
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: "admin".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };
        let key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(create_test_service().validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: "1".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };
        let key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(create_test_service().validate(&token).is_err());
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }
}
