use crate::errors::{GeolocatorError, Result};
use crate::storage::models::{AccessTokenRecord, GeoData, HistoryRecord, User};
use migration::entities::{access_token, search_history, user};

/// 数据库模型 -> HistoryRecord（geo_data 以 JSON 文本保存）
pub fn model_to_history(model: search_history::Model) -> Result<HistoryRecord> {
    let geo_data: GeoData = serde_json::from_str(&model.geo_data).map_err(|e| {
        GeolocatorError::serialization(format!(
            "历史记录 {} 的 geo_data 无法解析: {}",
            model.id, e
        ))
    })?;

    Ok(HistoryRecord {
        id: model.id,
        user_id: model.user_id,
        ip_address: model.ip_address,
        geo_data,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn model_to_token(model: access_token::Model) -> AccessTokenRecord {
    AccessTokenRecord {
        jti: model.id,
        user_id: model.user_id,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}
