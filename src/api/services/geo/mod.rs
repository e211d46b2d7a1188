//! 地理位置 API
//!
//! - 认证：登录、登出、当前用户
//! - IP 查询
//! - 查询历史的列表与批量删除

pub mod auth;
pub mod geolocation;
pub mod helpers;
pub mod history;
pub mod routes;
pub mod types;
pub mod validation;

pub use helpers::{error_response, json_response, validation_error_response};
pub use types::*;
pub use validation::FieldErrors;
