use std::fmt;

use async_trait::async_trait;

use crate::storage::GeoData;

/// Provider 查询失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 超过配置的请求超时
    Timeout,
    /// 连接、DNS、TLS 等传输层错误
    Transport(String),
    /// 非 2xx 响应
    Status(u16),
    /// 响应体不是 JSON 对象
    InvalidBody(String),
    /// 阻塞任务被取消或 panic
    Internal(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Timeout => write!(f, "request timed out"),
            ProviderError::Transport(msg) => write!(f, "transport error: {}", msg),
            ProviderError::Status(code) => write!(f, "provider returned HTTP {}", code),
            ProviderError::InvalidBody(msg) => write!(f, "invalid response body: {}", msg),
            ProviderError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// 地理位置查询 trait
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// 查询 IP 的地理位置；`None` 表示查询调用方自身的出口地址
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoData, ProviderError>;

    /// provider 名称（用于日志）
    fn name(&self) -> &'static str;
}
