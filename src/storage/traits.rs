use std::collections::HashSet;

use async_trait::async_trait;

use super::models::{GeoData, HistoryRecord};
use crate::errors::Result;

/// 查询历史存储
///
/// 所有读写都按 `user_id` 限定范围，其他用户的记录既不可见也不可删除。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 追加一条历史记录
    async fn insert_history(
        &self,
        user_id: i64,
        ip_address: &str,
        geo_data: &GeoData,
    ) -> Result<HistoryRecord>;

    /// 按创建时间倒序返回用户的全部记录
    async fn list_history_by_owner(&self, user_id: i64) -> Result<Vec<HistoryRecord>>;

    /// 删除 `ids` 中属于该用户的记录，返回实际删除条数
    async fn delete_history_by_owner(&self, user_id: i64, ids: &[i64]) -> Result<u64>;

    /// 返回 `ids` 中全局存在的记录 id（不区分用户，用于请求校验）
    async fn existing_history_ids(&self, ids: &[i64]) -> Result<HashSet<i64>>;
}
