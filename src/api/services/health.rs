use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use serde::Serialize;
use tracing::{error, info, trace};

use crate::storage::SeaOrmStorage;

/// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// 运行秒数
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}

/// Health Service
///
/// 直接检查存储连通性，不经过业务服务层。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let started = Instant::now();
        trace!("Received health check request");

        let backend = storage.backend_name().to_string();
        let storage_check = match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await
        {
            Ok(Ok(())) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some(format!("database error: {}", e.message())),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let now = chrono::Utc::now();
        let is_healthy = storage_check.status == "healthy";
        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
            checks: HealthChecks {
                storage: storage_check,
            },
            response_time_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "Health check completed in {:?}, status: {}",
            started.elapsed(),
            body.status
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        HttpResponse::build(status)
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(body)
    }

    /// 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
