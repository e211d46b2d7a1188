//! IP 地理位置查询端点

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use tracing::{debug, error, info};

use super::helpers::{error_response, json_response, last_query_value};
use super::types::DataResponse;
use crate::api::middleware::CurrentUser;
use crate::services::{LOOKUP_FAILED_MESSAGE, LookupOutcome, LookupService, ProviderError};

/// `GET /geolocation?ip=`
///
/// 查询串手动解析，`ip` 重复时取最后一个。
pub async fn lookup_geolocation(
    req: HttpRequest,
    CurrentUser(user): CurrentUser,
    service: web::Data<LookupService>,
) -> HttpResponse {
    let ip = match last_query_value(req.query_string(), "ip") {
        Ok(ip) => ip,
        Err(e) => {
            debug!("Rejecting malformed query string: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("Error: {}", e));
        }
    };

    let outcome = service.perform_lookup(ip.as_deref(), Some(&user)).await;

    match outcome {
        LookupOutcome::Found { geo_data, .. } => {
            json_response(StatusCode::OK, &DataResponse::new(geo_data))
        }
        LookupOutcome::Failed(ProviderError::Internal(msg)) => {
            error!("Geolocation lookup crashed: {}", msg);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", msg))
        }
        LookupOutcome::Failed(e) => {
            info!("Geolocation lookup failed for user {}: {}", user.id(), e);
            error_response(StatusCode::BAD_REQUEST, LOOKUP_FAILED_MESSAGE)
        }
    }
}
