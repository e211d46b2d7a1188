//! 用户账户的读写

use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::model_to_user;
use super::{SeaOrmStorage, now_micros, retry};
use crate::errors::{GeolocatorError, Result};
use crate::storage::models::{NewUser, User};
use migration::entities::user;

impl SeaOrmStorage {
    /// 创建用户；邮箱已存在时返回 Conflict
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        if self.find_credentials_by_email(&new_user.email).await?.is_some() {
            return Err(GeolocatorError::conflict(format!(
                "邮箱已被注册: {}",
                new_user.email
            )));
        }

        let now = now_micros();
        let model = user::ActiveModel {
            name: Set(new_user.name),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| GeolocatorError::database_operation(format!("创建用户失败: {}", e)))?;

        info!("User created: {} (#{})", inserted.email, inserted.id);
        Ok(model_to_user(inserted))
    }

    /// 按邮箱查找用户及其密码哈希
    pub async fn find_credentials_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        let db = &self.db;
        let found = retry::with_retry("find_user_by_email", self.retry_config, || async {
            user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(db)
                .await
        })
        .await?;

        Ok(found.map(|model| {
            let hash = model.password.clone();
            (model_to_user(model), hash)
        }))
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let db = &self.db;
        let found = retry::with_retry(&format!("find_user({})", id), self.retry_config, || async {
            user::Entity::find_by_id(id).one(db).await
        })
        .await?;

        Ok(found.map(model_to_user))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_user).collect())
    }

    /// 更新密码哈希；用户不存在时返回 NotFound
    pub async fn update_password(&self, email: &str, password_hash: String) -> Result<User> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| GeolocatorError::not_found(format!("用户不存在: {}", email)))?;

        let mut active: user::ActiveModel = model.into();
        active.password = Set(password_hash);
        active.updated_at = Set(now_micros());

        let updated = active.update(&self.db).await?;
        info!("Password updated for {}", updated.email);
        Ok(model_to_user(updated))
    }
}
