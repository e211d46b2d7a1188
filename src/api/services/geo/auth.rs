//! 认证端点

use actix_web::{HttpResponse, http::StatusCode, web};
use tracing::{error, info};

use super::helpers::{
    error_response, json_response, parse_json_body, payload_error_response,
    validation_error_response,
};
use super::types::{LoginResponse, MessageResponse};
use super::validation::validate_login;
use crate::api::middleware::CurrentUser;
use crate::services::AuthService;

/// `POST /login`
pub async fn login(
    body: Result<web::Bytes, actix_web::Error>,
    service: web::Data<AuthService>,
) -> HttpResponse {
    let body = match body {
        Ok(bytes) => parse_json_body(&bytes),
        Err(e) => return payload_error_response(&e, "Error: "),
    };

    let (email, password) = match validate_login(&body) {
        Ok(credentials) => credentials,
        Err(errors) => return validation_error_response(errors),
    };

    match service.login(&email, &password).await {
        Ok(result) => json_response(
            StatusCode::OK,
            &LoginResponse {
                success: true,
                message: "Login successful".to_string(),
                token: result.token.token,
                token_type: "Bearer".to_string(),
                expires_in: result.expires_in,
                user: result.user,
            },
        ),
        Err(e) if e.http_status() == StatusCode::UNAUTHORIZED => {
            info!("Login failed for {}", email);
            error_response(StatusCode::UNAUTHORIZED, e.message())
        }
        Err(e) => {
            error!("Login error for {}: {}", email, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", e.message()),
            )
        }
    }
}

/// `POST /logout`
pub async fn logout(
    CurrentUser(user): CurrentUser,
    service: web::Data<AuthService>,
) -> HttpResponse {
    match service.logout(&user).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &MessageResponse {
                success: true,
                message: "Logged out successfully".to_string(),
            },
        ),
        Err(e) => {
            error!("Logout failed for user {}: {}", user.id(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", e.message()),
            )
        }
    }
}

/// `GET /user`
pub async fn current_user(CurrentUser(user): CurrentUser) -> HttpResponse {
    json_response(StatusCode::OK, &user.user)
}
