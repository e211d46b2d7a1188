//! SeaORM storage backend
//!
//! 支持 SQLite、MySQL/MariaDB 和 PostgreSQL。

mod connection;
mod converters;
mod history;
pub mod retry;
mod tokens;
mod users;

use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{GeolocatorError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(GeolocatorError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 当前时间，截断到微秒（与 API 输出精度一致）
pub(crate) fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(GeolocatorError::database_config("DATABASE_URL 未设置"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config: retry::RetryConfig::from_config(),
        };

        run_migrations(&storage.db).await?;

        info!("{} storage initialized", storage.backend_name.to_uppercase());
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 获取底层数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 连通性检查（健康检查使用）
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| GeolocatorError::database_connection(e.to_string()))
    }

    /// 关闭连接池
    pub async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| GeolocatorError::database_connection(e.to_string()))
    }
}
