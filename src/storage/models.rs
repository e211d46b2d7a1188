use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider 返回的地理位置数据，字段集合由 Provider 决定，原样透传
pub type GeoData = serde_json::Map<String, serde_json::Value>;

/// 一次带 IP 的查询记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub user_id: i64,
    pub ip_address: String,
    pub geo_data: GeoData,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// 用户（不含密码哈希）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// 新建用户参数（password_hash 为 Argon2 PHC 字符串）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// 已签发的访问令牌
#[derive(Debug, Clone)]
pub struct AccessTokenRecord {
    pub jti: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// 时间戳序列化：RFC 3339，微秒精度，`Z` 结尾
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_history_record_serialized_fields() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let mut geo = GeoData::new();
        geo.insert("ip".into(), json!("8.8.8.8"));
        geo.insert("city".into(), json!("Mountain View"));

        let record = HistoryRecord {
            id: 7,
            user_id: 3,
            ip_address: "8.8.8.8".into(),
            geo_data: geo,
            created_at: created,
            updated_at: created,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["user_id"], 3);
        assert_eq!(value["ip_address"], "8.8.8.8");
        assert_eq!(value["geo_data"]["city"], "Mountain View");
        assert_eq!(value["created_at"], "2025-03-01T08:30:00.000000Z");
        assert_eq!(value["updated_at"], "2025-03-01T08:30:00.000000Z");
    }

    #[test]
    fn test_history_record_deserializes_from_api_json() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "id": 1,
            "user_id": 2,
            "ip_address": "1.1.1.1",
            "geo_data": {"loc": "-33.8,151.2"},
            "created_at": "2025-03-01T08:30:00.123456Z",
            "updated_at": "2025-03-01T08:30:00.123456Z"
        }))
        .unwrap();
        assert_eq!(record.geo_data["loc"], "-33.8,151.2");
        assert_eq!(record.created_at.timestamp_subsec_micros(), 123456);
    }
}
