//! 访问令牌登记表
//!
//! JWT 本身无状态，这里记录每个已签发令牌的 `jti`，登出即删除对应行。

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr,
};
use tracing::debug;

use super::converters::model_to_token;
use super::{SeaOrmStorage, now_micros, retry};
use crate::errors::Result;
use crate::storage::models::AccessTokenRecord;
use migration::entities::access_token;

impl SeaOrmStorage {
    pub async fn insert_token(&self, record: &AccessTokenRecord) -> Result<()> {
        access_token::ActiveModel {
            id: Set(record.jti.clone()),
            user_id: Set(record.user_id),
            created_at: Set(record.created_at),
            expires_at: Set(record.expires_at),
            last_used_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// 查找未过期的令牌
    pub async fn find_token(&self, jti: &str) -> Result<Option<AccessTokenRecord>> {
        let db = &self.db;
        let found = retry::with_retry("find_token", self.retry_config, || async {
            access_token::Entity::find_by_id(jti.to_string()).one(db).await
        })
        .await?;

        Ok(found
            .map(model_to_token)
            .filter(|token| token.expires_at > Utc::now()))
    }

    /// 删除令牌，返回是否存在
    pub async fn delete_token(&self, jti: &str) -> Result<bool> {
        let result = access_token::Entity::delete_by_id(jti.to_string())
            .exec(&self.db)
            .await?;
        debug!("Access token revoked: {}", jti);
        Ok(result.rows_affected > 0)
    }

    pub async fn touch_token(&self, jti: &str) -> Result<()> {
        access_token::Entity::update_many()
            .col_expr(access_token::Column::LastUsedAt, Expr::value(now_micros()))
            .filter(access_token::Column::Id.eq(jti))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// 清理过期令牌，返回删除条数
    pub async fn purge_expired_tokens(&self) -> Result<u64> {
        let result = access_token::Entity::delete_many()
            .filter(access_token::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
