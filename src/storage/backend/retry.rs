//! 数据库操作重试
//!
//! 仅对连接类错误和锁冲突类错误重试，业务错误直接返回。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(code) = sqlx_err.as_database_error().and_then(|e| e.code()) {
                // MySQL 1213/1205，PostgreSQL 40001/40P01，SQLite BUSY/LOCKED
                return matches!(
                    code.as_ref(),
                    "1213" | "1205" | "40001" | "40P01" | "5" | "6"
                );
            }
            is_retryable_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_retryable_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// 从全局配置读取；配置尚未初始化时使用默认值
    pub fn from_config() -> Self {
        match crate::config::try_get_config() {
            Some(config) => Self {
                max_retries: config.database.retry_count,
                base_delay_ms: config.database.retry_base_delay_ms,
                max_delay_ms: config.database.retry_max_delay_ms,
            },
            None => Self::default(),
        }
    }
}

/// 指数退避重试执行器
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Operation '{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && is_retryable_error(&e) => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 指数退避，附加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let capped = base_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
        .min(max_ms);
    let jitter = rand::random::<u64>() % (capped / 4 + 1);
    capped.saturating_add(jitter)
}
