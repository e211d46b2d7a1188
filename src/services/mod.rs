//! Service layer for business logic
//!
//! HTTP 处理器和 CLI 共用的业务逻辑。

mod auth_service;
pub mod geoip;
mod lookup_service;

pub use auth_service::{AuthService, AuthenticatedUser, LoginResult};
pub use geoip::{GeoLookup, IpinfoProvider, ProviderError};
pub use lookup_service::{LOOKUP_FAILED_MESSAGE, LookupOutcome, LookupService};
