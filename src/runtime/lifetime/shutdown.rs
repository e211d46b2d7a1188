use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use crate::storage::SeaOrmStorage;
use crate::system::signal::wait_for_shutdown;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待关闭信号，然后关闭数据库连接池
pub async fn listen_for_shutdown(storage: &SeaOrmStorage) {
    wait_for_shutdown().await;

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), storage.close()).await {
        Ok(Ok(())) => info!("Database connections closed"),
        Ok(Err(e)) => error!("Failed to close database connections: {}", e),
        Err(_) => error!(
            "Closing database connections timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
