//! Client layer for the CLI
//!
//! 通过 HTTP 调用 API，并在本地维护查询页面的状态。
//!
//! ```text
//! CLI → HomePage (状态机) → GeoApi ──→ HTTP API
//! ```

mod api_client;
mod home;
pub mod render;

pub use api_client::{GeoApi, HttpGeoApi, LoginToken};
pub use home::{
    DELETE_FAILED, EMPTY_IP, HomePage, HomeState, INVALID_IP, SEARCH_FAILED, SELF_LOOKUP_FAILED,
    SearchRequest,
};

use std::fmt;

/// Errors from the client layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// 非 2xx 响应；`message` 为响应体中的 `message` 字段
    Http { status: u16, message: Option<String> },
    /// 连接失败、超时等
    Transport(String),
    /// 响应体无法解析
    InvalidResponse(String),
}

impl ClientError {
    /// 服务端返回的消息（若有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http {
                status,
                message: Some(message),
            } => write!(f, "HTTP {}: {}", status, message),
            ClientError::Http {
                status,
                message: None,
            } => write!(f, "HTTP {}", status),
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for crate::interfaces::cli::CliError {
    fn from(err: ClientError) -> Self {
        crate::interfaces::cli::CliError::CommandError(err.to_string())
    }
}
