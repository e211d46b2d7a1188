//! IP lookup service
//!
//! 调用 Provider，并在条件满足时把结果写入查询历史。

use std::sync::Arc;

use tracing::{info, warn};

use super::auth_service::AuthenticatedUser;
use super::geoip::{GeoLookup, ProviderError};
use crate::storage::{GeoData, HistoryStore};
use crate::utils::ip::normalize_ip_input;

/// Provider 失败时返回给客户端的固定消息
pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to fetch geolocation data";

/// 一次查询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found {
        geo_data: GeoData,
        /// 写入的历史记录 id；自身查询、匿名查询或写入失败时为 None
        history_id: Option<i64>,
    },
    Failed(ProviderError),
}

#[derive(Clone)]
pub struct LookupService {
    provider: Arc<dyn GeoLookup>,
    history: Arc<dyn HistoryStore>,
}

impl LookupService {
    pub fn new(provider: Arc<dyn GeoLookup>, history: Arc<dyn HistoryStore>) -> Self {
        Self { provider, history }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// 查询 IP 地理位置
    ///
    /// `ip` 去除空白后为空等同于未提供，即查询自身地址，此时不记录历史。
    /// 历史写入失败只记录日志，不影响查询结果。
    pub async fn perform_lookup(
        &self,
        ip: Option<&str>,
        requester: Option<&AuthenticatedUser>,
    ) -> LookupOutcome {
        let ip = normalize_ip_input(ip);

        let geo_data = match self.provider.lookup(ip).await {
            Ok(data) => data,
            Err(e) => return LookupOutcome::Failed(e),
        };

        let history_id = match (ip, requester) {
            (Some(ip), Some(user)) => {
                match self.history.insert_history(user.id(), ip, &geo_data).await {
                    Ok(record) => {
                        info!("Lookup {} recorded as history #{}", ip, record.id);
                        Some(record.id)
                    }
                    Err(e) => {
                        warn!(
                            "Failed to record lookup history for user {} ({}): {}",
                            user.id(),
                            ip,
                            e
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        LookupOutcome::Found {
            geo_data,
            history_id,
        }
    }
}
