//! 地理位置 Provider
//!
//! 每次查询都是一次实时的外部 HTTP 请求，不缓存、不重试。

mod external_api;
mod provider;

pub use external_api::IpinfoProvider;
pub use provider::{GeoLookup, ProviderError};
