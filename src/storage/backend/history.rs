//! 查询历史的读写

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, error};

use super::converters::model_to_history;
use super::{SeaOrmStorage, now_micros, retry};
use crate::errors::{GeolocatorError, Result};
use crate::storage::models::{GeoData, HistoryRecord};
use crate::storage::traits::HistoryStore;
use migration::entities::search_history;

#[async_trait]
impl HistoryStore for SeaOrmStorage {
    async fn insert_history(
        &self,
        user_id: i64,
        ip_address: &str,
        geo_data: &GeoData,
    ) -> Result<HistoryRecord> {
        let now = now_micros();
        let model = search_history::ActiveModel {
            user_id: Set(user_id),
            ip_address: Set(ip_address.to_string()),
            geo_data: Set(serde_json::to_string(geo_data)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            GeolocatorError::database_operation(format!(
                "写入查询历史失败 (user: {}, ip: {}): {}",
                user_id, ip_address, e
            ))
        })?;

        debug!("History #{} recorded for user {}", inserted.id, user_id);
        model_to_history(inserted)
    }

    async fn list_history_by_owner(&self, user_id: i64) -> Result<Vec<HistoryRecord>> {
        let db = &self.db;
        let models = retry::with_retry(
            &format!("list_history({})", user_id),
            self.retry_config,
            || async {
                search_history::Entity::find()
                    .filter(search_history::Column::UserId.eq(user_id))
                    .order_by_desc(search_history::Column::CreatedAt)
                    .order_by_desc(search_history::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            error!("查询历史列表失败（重试后仍失败）: {}", e);
            GeolocatorError::database_operation(format!("查询历史列表失败: {}", e))
        })?;

        models.into_iter().map(model_to_history).collect()
    }

    async fn delete_history_by_owner(&self, user_id: i64, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let db = &self.db;
        let result = retry::with_retry(
            &format!("delete_history({})", user_id),
            self.retry_config,
            || async {
                search_history::Entity::delete_many()
                    .filter(search_history::Column::UserId.eq(user_id))
                    .filter(search_history::Column::Id.is_in(ids.iter().copied()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            GeolocatorError::database_operation(format!("删除查询历史失败: {}", e))
        })?;

        debug!(
            "Deleted {} of {} requested history records for user {}",
            result.rows_affected,
            ids.len(),
            user_id
        );
        Ok(result.rows_affected)
    }

    async fn existing_history_ids(&self, ids: &[i64]) -> Result<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let db = &self.db;
        let found: Vec<i64> = retry::with_retry("existing_history_ids", self.retry_config, || async {
            search_history::Entity::find()
                .select_only()
                .column(search_history::Column::Id)
                .filter(search_history::Column::Id.is_in(ids.iter().copied()))
                .into_tuple::<i64>()
                .all(db)
                .await
        })
        .await
        .map_err(|e| GeolocatorError::database_operation(format!("查询历史 id 失败: {}", e)))?;

        Ok(found.into_iter().collect())
    }
}
