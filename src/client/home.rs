//! 查询页面状态机
//!
//! 页面状态：输入框、当前位置、历史列表、勾选集合、错误、加载中、地图 key。
//! 每次查询先领取一个递增的 ticket，只有最新 ticket 的结果会被应用。

use tracing::{debug, warn};

use super::{ClientError, GeoApi};
use crate::storage::{GeoData, HistoryRecord};
use crate::utils::ip::is_valid_ip;

pub const EMPTY_IP: &str = "Please enter an IP address";
pub const INVALID_IP: &str = "Please enter a valid IP address";
pub const SEARCH_FAILED: &str = "Failed to fetch geolocation for this IP";
pub const SELF_LOOKUP_FAILED: &str = "Failed to fetch your geolocation";
pub const DELETE_FAILED: &str = "Failed to delete history";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeState {
    pub ip_input: String,
    pub geo_data: Option<GeoData>,
    pub history: Vec<HistoryRecord>,
    /// 勾选的历史 id，按勾选顺序
    pub selected: Vec<i64>,
    pub error: Option<String>,
    pub loading: bool,
    /// 每次位置变化递增，用于强制重建地图
    pub map_key: u64,
}

/// 已通过校验、等待发送的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: u64,
    /// `None` 表示查询自身地址
    pub ip: Option<String>,
}

pub struct HomePage<A: GeoApi> {
    api: A,
    state: HomeState,
    latest_ticket: u64,
}

impl<A: GeoApi> HomePage<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: HomeState::default(),
            latest_ticket: 0,
        }
    }

    pub fn state(&self) -> &HomeState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn set_ip_input(&mut self, input: impl Into<String>) {
        self.state.ip_input = input.into();
    }

    /// 首次进入页面：查询自身位置，然后加载历史
    pub async fn mount(&mut self) {
        self.fetch_self_location().await;
        self.refresh_history().await;
    }

    fn issue_ticket(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.state.loading = true;
        self.latest_ticket
    }

    /// 发起自身位置查询
    pub fn begin_self_lookup(&mut self) -> SearchRequest {
        self.state.error = None;
        SearchRequest {
            ticket: self.issue_ticket(),
            ip: None,
        }
    }

    /// 校验输入框并发起查询；校验失败时设置错误并返回 None
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        self.state.error = None;

        let ip = self.state.ip_input.trim();
        if ip.is_empty() {
            self.state.error = Some(EMPTY_IP.to_string());
            return None;
        }
        if !is_valid_ip(ip) {
            self.state.error = Some(INVALID_IP.to_string());
            return None;
        }

        let ip = ip.to_string();
        Some(SearchRequest {
            ticket: self.issue_ticket(),
            ip: Some(ip),
        })
    }

    /// 应用查询结果；ticket 不是最新时丢弃并返回 false
    pub fn complete_lookup(
        &mut self,
        request: &SearchRequest,
        result: Result<GeoData, ClientError>,
    ) -> bool {
        if request.ticket != self.latest_ticket {
            debug!(
                "Discarding stale lookup result (ticket {}, latest {})",
                request.ticket, self.latest_ticket
            );
            return false;
        }

        self.state.loading = false;
        match result {
            Ok(geo_data) => {
                self.state.geo_data = Some(geo_data);
                self.state.map_key += 1;
            }
            Err(e) => {
                let message = match request.ip {
                    Some(_) => e.server_message().unwrap_or(SEARCH_FAILED).to_string(),
                    None => SELF_LOOKUP_FAILED.to_string(),
                };
                debug!("Lookup failed: {}", e);
                self.state.error = Some(message);
            }
        }
        true
    }

    pub async fn fetch_self_location(&mut self) {
        let request = self.begin_self_lookup();
        let result = self.api.lookup(None).await;
        self.complete_lookup(&request, result);
    }

    /// 提交输入框中的 IP；成功后刷新历史
    pub async fn submit_search(&mut self) {
        let Some(request) = self.begin_search() else {
            return;
        };
        let result = self.api.lookup(request.ip.as_deref()).await;
        let succeeded = result.is_ok();
        if self.complete_lookup(&request, result) && succeeded {
            self.refresh_history().await;
        }
    }

    /// 重新加载历史；失败只记录日志
    pub async fn refresh_history(&mut self) {
        match self.api.history().await {
            Ok(history) => {
                let ids: Vec<i64> = history.iter().map(|h| h.id).collect();
                self.state.selected.retain(|id| ids.contains(id));
                self.state.history = history;
            }
            Err(e) => warn!("Failed to fetch history: {}", e),
        }
    }

    /// 清空输入、错误和勾选，重新查询自身位置
    pub async fn clear(&mut self) {
        self.state.ip_input.clear();
        self.state.error = None;
        self.state.selected.clear();
        self.fetch_self_location().await;
    }

    /// 点击历史条目：本地切换显示，不发请求
    pub fn select_history(&mut self, id: i64) -> bool {
        let Some(item) = self.state.history.iter().find(|h| h.id == id) else {
            return false;
        };
        self.state.geo_data = Some(item.geo_data.clone());
        self.state.ip_input = item.ip_address.clone();
        self.state.map_key += 1;
        self.state.error = None;
        true
    }

    pub fn toggle_selection(&mut self, id: i64) {
        if let Some(pos) = self.state.selected.iter().position(|&s| s == id) {
            self.state.selected.remove(pos);
        } else {
            self.state.selected.push(id);
        }
    }

    /// 全选；已全选时取消全选
    pub fn toggle_select_all(&mut self) {
        if self.all_selected() {
            self.state.selected.clear();
        } else {
            self.state.selected = self.state.history.iter().map(|h| h.id).collect();
        }
    }

    pub fn all_selected(&self) -> bool {
        self.state.selected.len() == self.state.history.len()
    }

    /// 删除确认提示
    pub fn delete_prompt(&self) -> String {
        format!("Delete {} item(s)?", self.state.selected.len())
    }

    /// 删除勾选的历史
    ///
    /// 未勾选时不做任何事；`confirm` 收到提示文本，返回 false 则取消。
    /// 返回实际删除条数（未执行时为 None）。
    pub async fn delete_selected<F>(&mut self, confirm: F) -> Option<u64>
    where
        F: FnOnce(&str) -> bool,
    {
        if self.state.selected.is_empty() {
            return None;
        }
        if !confirm(&self.delete_prompt()) {
            return None;
        }

        let ids = self.state.selected.clone();
        match self.api.delete_history(&ids).await {
            Ok(count) => {
                self.state.selected.clear();
                self.refresh_history().await;
                Some(count)
            }
            Err(e) => {
                warn!("Failed to delete history: {}", e);
                self.state.error = Some(DELETE_FAILED.to_string());
                None
            }
        }
    }

    /// `loc` 字段（"lat,lng"）解析出的坐标，无法解析时为 (0, 0)
    pub fn coordinates(&self) -> (f64, f64) {
        self.state
            .geo_data
            .as_ref()
            .and_then(|geo| geo.get("loc"))
            .and_then(|loc| loc.as_str())
            .and_then(parse_loc)
            .unwrap_or((0.0, 0.0))
    }

    /// 只有 `loc` 存在时才显示地图
    pub fn show_map(&self) -> bool {
        self.state
            .geo_data
            .as_ref()
            .and_then(|geo| geo.get("loc"))
            .and_then(|loc| loc.as_str())
            .is_some_and(|loc| !loc.is_empty())
    }
}

fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lng) = loc.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}
