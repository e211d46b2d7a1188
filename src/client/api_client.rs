//! HTTP API 客户端
//!
//! ureq 为同步客户端，请求在 `spawn_blocking` 中执行。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use ureq::Agent;

use super::ClientError;
use crate::storage::{GeoData, HistoryRecord, User};

/// 页面状态机依赖的 API
#[async_trait]
pub trait GeoApi: Send + Sync {
    /// `None` 查询自身地址
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoData, ClientError>;
    async fn history(&self) -> Result<Vec<HistoryRecord>, ClientError>;
    /// 返回实际删除条数
    async fn delete_history(&self, ids: &[i64]) -> Result<u64, ClientError>;
}

/// 登录返回的令牌
#[derive(Debug, Clone, Deserialize)]
pub struct LoginToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct DeleteEnvelope {
    deleted_count: u64,
}

#[derive(Clone)]
pub struct HttpGeoApi {
    /// 形如 `http://127.0.0.1:8080/api`
    base_url: String,
    token: Option<String>,
    agent: Agent,
}

#[derive(Clone, Copy)]
enum Method {
    Get,
    Post,
    Delete,
}

impl HttpGeoApi {
    pub fn new(server_url: &str, api_prefix: &str, token: Option<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: format!(
                "{}/{}",
                server_url.trim_end_matches('/'),
                api_prefix.trim_matches('/')
            )
            .trim_end_matches('/')
            .to_string(),
            token,
            agent,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginToken, ClientError> {
        let body = json!({ "email": email, "password": password });
        let value = self.send(Method::Post, "login", Vec::new(), Some(body)).await?;
        decode(value)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send(Method::Post, "logout", Vec::new(), None).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let value = self.send(Method::Get, "user", Vec::new(), None).await?;
        decode(value)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(&'static str, String)>,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = self.endpoint(path);
        let agent = self.agent.clone();
        let token = self.token.clone();

        tokio::task::spawn_blocking(move || send_sync(agent, method, url, token, query, body))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
    }
}

fn send_sync(
    agent: Agent,
    method: Method,
    url: String,
    token: Option<String>,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
) -> Result<Value, ClientError> {
    debug!("Client request: {}", url);
    let auth = token.map(|t| format!("Bearer {}", t));

    let result = match method {
        Method::Get => {
            let mut req = agent.get(&url).header("Accept", "application/json");
            for (key, value) in &query {
                req = req.query(*key, value);
            }
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth);
            }
            req.call()
        }
        Method::Post | Method::Delete => {
            let mut req = match method {
                Method::Post => agent.post(&url),
                _ => agent.delete(&url).force_send_body(),
            }
            .header("Accept", "application/json");
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth);
            }
            req.send_json(body.unwrap_or_else(|| json!({})))
        }
    };

    let resp = result.map_err(|e| ClientError::Transport(e.to_string()))?;
    let status = resp.status();
    let value: Option<Value> = resp.into_body().read_json().ok();

    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: value.as_ref().and_then(extract_message),
        });
    }

    value.ok_or_else(|| ClientError::InvalidResponse("response body is not JSON".to_string()))
}

/// 错误响应中的 `message` 字段
pub(crate) fn extract_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl GeoApi for HttpGeoApi {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoData, ClientError> {
        let query = ip.map(|ip| vec![("ip", ip.to_string())]).unwrap_or_default();
        let value = self.send(Method::Get, "geolocation", query, None).await?;
        decode::<DataEnvelope<GeoData>>(value).map(|e| e.data)
    }

    async fn history(&self) -> Result<Vec<HistoryRecord>, ClientError> {
        let value = self.send(Method::Get, "history", Vec::new(), None).await?;
        decode::<DataEnvelope<Vec<HistoryRecord>>>(value).map(|e| e.data)
    }

    async fn delete_history(&self, ids: &[i64]) -> Result<u64, ClientError> {
        let body = json!({ "ids": ids });
        let value = self
            .send(Method::Delete, "history", Vec::new(), Some(body))
            .await?;
        decode::<DeleteEnvelope>(value).map(|e| e.deleted_count)
    }
}
