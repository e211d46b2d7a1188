use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::jwt::JwtService;
use crate::api::services::AppStartTime;
use crate::services::{AuthService, GeoLookup, IpinfoProvider, LookupService};
use crate::storage::{HistoryStore, SeaOrmStorage, StorageFactory};

/// 服务器运行所需的共享组件
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub history: Arc<dyn HistoryStore>,
    pub lookup_service: LookupService,
    pub auth_service: AuthService,
    pub app_start_time: AppStartTime,
    pub route_config: RouteConfig,
}

#[derive(Clone, Debug)]
pub struct RouteConfig {
    pub api_prefix: String,
    pub health_prefix: String,
}

impl StartupContext {
    /// 由已创建的组件装配（测试中用于注入 mock provider）
    pub fn assemble(
        storage: Arc<SeaOrmStorage>,
        provider: Arc<dyn GeoLookup>,
        jwt: Arc<JwtService>,
        route_config: RouteConfig,
    ) -> Self {
        let history: Arc<dyn HistoryStore> = storage.clone();
        Self {
            lookup_service: LookupService::new(provider, history.clone()),
            auth_service: AuthService::new(storage.clone(), jwt),
            history,
            storage,
            app_start_time: AppStartTime {
                start_datetime: chrono::Utc::now(),
            },
            route_config,
        }
    }
}

/// 安装 rustls 默认加密实现（多次调用无副作用）
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// 准备服务器启动的上下文：存储、Provider、认证和路由配置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider();

    let config = crate::config::get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    match storage.purge_expired_tokens().await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired access tokens", n),
        Err(e) => warn!("Failed to purge expired access tokens (non-fatal): {}", e),
    }

    let provider: Arc<dyn GeoLookup> = Arc::new(IpinfoProvider::from_config(&config.provider));
    info!(
        "Geolocation provider: {} ({}, timeout {}s)",
        provider.name(),
        config.provider.base_url,
        config.provider.timeout_secs
    );

    let jwt = Arc::new(JwtService::from_config(&config.auth));

    let route_config = RouteConfig {
        api_prefix: config.routes.api_prefix.clone(),
        health_prefix: config.routes.health_prefix.clone(),
    };

    let context = StartupContext::assemble(storage, provider, jwt, route_config);

    debug!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}
