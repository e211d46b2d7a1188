//! 用户认证与账户管理
//!
//! 令牌是 JWT，同时在 `access_tokens` 表登记 `jti`；
//! 校验时两者都必须通过，登出即删除登记。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::jwt::{IssuedToken, JwtService};
use crate::errors::{GeolocatorError, Result};
use crate::storage::{AccessTokenRecord, NewUser, SeaOrmStorage, User};
use crate::utils::is_valid_email;
use crate::utils::password::{hash_password, verify_password};

/// 登录失败时统一返回的消息（不区分邮箱不存在和密码错误）
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

const MIN_PASSWORD_LEN: usize = 8;

/// 已通过认证的请求方
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    /// 当前令牌的 jti
    pub token_id: String,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// 登录成功的结果
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub token: IssuedToken,
    /// 有效期（秒）
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>, jwt: Arc<JwtService>) -> Self {
        Self { storage, jwt }
    }

    /// 校验邮箱和密码，签发新令牌
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let Some((user, hash)) = self.storage.find_credentials_by_email(email).await? else {
            debug!("Login rejected: unknown email {}", email);
            return Err(GeolocatorError::unauthorized(INVALID_CREDENTIALS));
        };

        match verify_password(password, &hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Login rejected: wrong password for {}", email);
                return Err(GeolocatorError::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => {
                warn!("Stored password hash for user {} is invalid: {}", user.id, e);
                return Err(GeolocatorError::unauthorized(INVALID_CREDENTIALS));
            }
        }

        let token = self
            .jwt
            .issue(user.id)
            .map_err(|e| GeolocatorError::internal_error(format!("签发令牌失败: {}", e)))?;

        self.storage
            .insert_token(&AccessTokenRecord {
                jti: token.jti.clone(),
                user_id: user.id,
                created_at: token.issued_at,
                expires_at: token.expires_at,
            })
            .await?;

        info!("User {} logged in", user.email);
        Ok(LoginResult {
            user,
            token,
            expires_in: self.jwt.expires_in(),
        })
    }

    /// 解析 Bearer 令牌；签名、过期、登记任一不通过都返回 Unauthorized
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self
            .jwt
            .validate(token)
            .map_err(|e| GeolocatorError::unauthorized(format!("invalid token: {}", e)))?;

        let record = self
            .storage
            .find_token(&claims.jti)
            .await?
            .ok_or_else(|| GeolocatorError::unauthorized("token revoked or expired"))?;

        let user = self
            .storage
            .find_user_by_id(record.user_id)
            .await?
            .ok_or_else(|| GeolocatorError::unauthorized("user no longer exists"))?;

        if let Err(e) = self.storage.touch_token(&record.jti).await {
            debug!("Failed to update token last_used_at: {}", e);
        }

        Ok(AuthenticatedUser {
            user,
            token_id: record.jti,
        })
    }

    /// 吊销当前令牌
    pub async fn logout(&self, auth: &AuthenticatedUser) -> Result<()> {
        self.storage.delete_token(&auth.token_id).await?;
        info!("User {} logged out", auth.user.email);
        Ok(())
    }

    pub async fn create_user(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(GeolocatorError::validation("用户名不能为空"));
        }
        if !is_valid_email(email) {
            return Err(GeolocatorError::validation(format!("邮箱格式无效: {}", email)));
        }
        validate_password(password)?;

        self.storage
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
            })
            .await
    }

    pub async fn reset_password(&self, email: &str, password: &str) -> Result<User> {
        validate_password(password)?;
        self.storage
            .update_password(email.trim(), hash_password(password)?)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.storage.list_users().await
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(GeolocatorError::validation(format!(
            "密码长度至少为 {} 个字符",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("密码密码密码密码").is_ok());
    }
}
