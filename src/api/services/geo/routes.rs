//! API 路由配置

use actix_web::web;

use super::auth::{current_user, login, logout};
use super::geolocation::lookup_geolocation;
use super::history::{delete_history, list_history};

/// 登录接口的完整路径（认证中间件放行）
pub fn login_path(api_prefix: &str) -> String {
    format!("{}/login", api_prefix.trim_end_matches('/'))
}

/// API 路由，挂载在 `routes.api_prefix` 下
///
/// - POST /login（公开）
/// - POST /logout
/// - GET /user
/// - GET /geolocation
/// - GET/DELETE /history
pub fn api_routes() -> actix_web::Scope {
    web::scope("")
        .route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout))
        .route("/user", web::get().to(current_user))
        .route("/geolocation", web::get().to(lookup_geolocation))
        .route("/history", web::get().to(list_history))
        .route("/history", web::delete().to(delete_history))
}
