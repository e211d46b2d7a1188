//! ipinfo 风格的外部 API 实现
//!
//! `GET {base_url}/{ip}/geo` 或 `GET {base_url}/geo`，响应体为 JSON 对象。
//! ureq 是同步客户端，请求放在 `spawn_blocking` 中执行。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::provider::{GeoLookup, ProviderError};
use crate::storage::GeoData;

pub struct IpinfoProvider {
    base_url: String,
    agent: Agent,
}

impl IpinfoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// 从全局配置创建
    pub fn from_config(config: &crate::config::ProviderConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// 构造请求 URL（IP 作为单个 path segment 编码）
    pub fn lookup_url(&self, ip: Option<&str>) -> String {
        match ip {
            Some(ip) => format!("{}/{}/geo", self.base_url, urlencoding::encode(ip)),
            None => format!("{}/geo", self.base_url),
        }
    }

    fn fetch_sync(agent: Agent, url: String) -> Result<GeoData, ProviderError> {
        let resp = agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Timeout(_) => ProviderError::Timeout,
                other => ProviderError::Transport(other.to_string()),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: serde_json::Value = resp
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::InvalidBody(e.to_string()))?;

        match body {
            serde_json::Value::Object(map) => {
                trace!("Provider returned {} fields", map.len());
                Ok(map)
            }
            other => Err(ProviderError::InvalidBody(format!(
                "expected JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait]
impl GeoLookup for IpinfoProvider {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoData, ProviderError> {
        let url = self.lookup_url(ip);
        debug!("Geolocation lookup: {}", url);

        let agent = self.agent.clone();
        let result = tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url))
            .await
            .map_err(|e| ProviderError::Internal(e.to_string()))?;

        if let Err(ref e) = result {
            warn!("Geolocation provider failed for {:?}: {}", ip, e);
        }
        result
    }

    fn name(&self) -> &'static str {
        "ipinfo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_for_ip() {
        let provider = IpinfoProvider::new("https://ipinfo.io/", Duration::from_secs(10));
        assert_eq!(
            provider.lookup_url(Some("8.8.8.8")),
            "https://ipinfo.io/8.8.8.8/geo"
        );
    }

    #[test]
    fn test_lookup_url_for_self() {
        let provider = IpinfoProvider::new("https://ipinfo.io", Duration::from_secs(10));
        assert_eq!(provider.lookup_url(None), "https://ipinfo.io/geo");
    }

    #[test]
    fn test_lookup_url_encodes_path_segment() {
        let provider = IpinfoProvider::new("http://localhost", Duration::from_secs(1));
        assert_eq!(
            provider.lookup_url(Some("a/b c")),
            "http://localhost/a%2Fb%20c/geo"
        );
        assert_eq!(
            provider.lookup_url(Some("2001:db8::1")),
            "http://localhost/2001%3Adb8%3A%3A1/geo"
        );
    }

    #[test]
    fn test_provider_error_display() {
        assert_eq!(ProviderError::Status(503).to_string(), "provider returned HTTP 503");
        assert_eq!(ProviderError::Timeout.to_string(), "request timed out");
    }
}
