//! 查询历史端点

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};
use tracing::{error, info};

use super::helpers::{
    error_response, json_response, parse_json_body, payload_error_response,
    validation_error_response,
};
use super::types::{DataResponse, DeleteHistoryResponse};
use super::validation::{candidate_integers, finish_ids_validation, inspect_delete_ids};
use crate::api::middleware::CurrentUser;
use crate::storage::HistoryStore;

/// `GET /history`
pub async fn list_history(
    CurrentUser(user): CurrentUser,
    store: web::Data<Arc<dyn HistoryStore>>,
) -> HttpResponse {
    match store.list_history_by_owner(user.id()).await {
        Ok(records) => json_response(StatusCode::OK, &DataResponse::new(records)),
        Err(e) => {
            error!("Failed to list history for user {}: {}", user.id(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error fetching history: {}", e.message()),
            )
        }
    }
}

/// `DELETE /history`，请求体 `{ids:[...]}`
///
/// 校验时 id 的存在性不区分用户，删除时只删除当前用户自己的记录。
pub async fn delete_history(
    CurrentUser(user): CurrentUser,
    body: Result<web::Bytes, actix_web::Error>,
    store: web::Data<Arc<dyn HistoryStore>>,
) -> HttpResponse {
    let body = match body {
        Ok(bytes) => parse_json_body(&bytes),
        Err(e) => {
            info!("Rejecting delete body from user {}: {}", user.id(), e);
            return payload_error_response(&e, "Error deleting history: ");
        }
    };

    let candidates = match inspect_delete_ids(&body) {
        Ok(candidates) => candidates,
        Err(errors) => return validation_error_response(errors),
    };

    let existing = match store
        .existing_history_ids(&candidate_integers(&candidates))
        .await
    {
        Ok(existing) => existing,
        Err(e) => {
            error!("Failed to validate history ids: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error deleting history: {}", e.message()),
            );
        }
    };

    let ids = match finish_ids_validation(&candidates, &existing) {
        Ok(ids) => ids,
        Err(errors) => return validation_error_response(errors),
    };

    match store.delete_history_by_owner(user.id(), &ids).await {
        Ok(deleted_count) => {
            info!(
                "User {} deleted {} history records ({} requested)",
                user.id(),
                deleted_count,
                ids.len()
            );
            json_response(
                StatusCode::OK,
                &DeleteHistoryResponse {
                    success: true,
                    message: "History deleted successfully".to_string(),
                    deleted_count,
                },
            )
        }
        Err(e) => {
            error!("Failed to delete history for user {}: {}", user.id(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error deleting history: {}", e.message()),
            )
        }
    }
}
