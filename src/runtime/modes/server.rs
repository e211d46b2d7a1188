//! Server mode
//!
//! 配置并启动 HTTP 服务器。

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::{RequestIdMiddleware, UserAuth};
use crate::api::services::{api_routes, health_routes, login_path};
use crate::config::CorsConfig;
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::StartupContext;

/// JSON 请求体大小上限
const PAYLOAD_LIMIT_BYTES: usize = 64 * 1024;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        tracing::error!(
            "allow_any_origin + allow_credentials would let any website make authenticated \
            cross-origin requests. Credentials are disabled."
        );
    }
}

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 未启用时使用浏览器默认的同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    let mut cors = Cors::default().allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"]);

    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    for header in &cors_config.allowed_headers {
        cors = cors.allowed_header(header.as_str());
    }

    cors = cors
        .expose_headers(vec!["X-Request-ID"])
        .max_age(cors_config.max_age as usize);

    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// 注册共享状态和全部路由（服务器与集成测试共用）
pub fn configure_app(cfg: &mut web::ServiceConfig, ctx: &StartupContext) {
    let api_prefix = ctx.route_config.api_prefix.clone();
    let health_prefix = ctx.route_config.health_prefix.clone();

    cfg.app_data(web::Data::new(ctx.storage.clone()))
        .app_data(web::Data::new(ctx.history.clone()))
        .app_data(web::Data::new(ctx.lookup_service.clone()))
        .app_data(web::Data::new(ctx.auth_service.clone()))
        .app_data(web::Data::new(ctx.app_start_time.clone()))
        .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT_BYTES))
        .service(web::scope(&health_prefix).service(health_routes()))
        .service(
            web::scope(&api_prefix)
                .wrap(UserAuth::new(vec![login_path(&api_prefix)]))
                .service(api_routes()),
        );
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let config = crate::config::get_config();
    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let storage_for_shutdown = startup.storage.clone();
    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate"))
                    .add(("X-Content-Type-Options", "nosniff")),
            )
            .wrap(RequestIdMiddleware)
            .configure(|cfg| configure_app(cfg, &startup))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals();

    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&storage_for_shutdown) => {
            handle.stop(true).await;
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
