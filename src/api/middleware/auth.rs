//! Bearer token authentication middleware
//!
//! 解析 `Authorization: Bearer <token>`，成功后把 [`AuthenticatedUser`]
//! 放入 request extensions，处理器通过 [`CurrentUser`] 提取。

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web,
};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::{debug, error, trace};

use crate::services::{AuthService, AuthenticatedUser};

/// 未认证时的固定响应体消息
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated.";

pub fn unauthenticated_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": UNAUTHENTICATED_MESSAGE }))
}

/// 用户认证中间件
///
/// `public_paths` 中的路径（如登录接口）直接放行。
#[derive(Clone)]
pub struct UserAuth {
    public_paths: Rc<Vec<String>>,
}

impl UserAuth {
    pub fn new(public_paths: Vec<String>) -> Self {
        Self {
            public_paths: Rc::new(public_paths),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for UserAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = UserAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UserAuthMiddleware {
            service: Rc::new(service),
            public_paths: self.public_paths.clone(),
        }))
    }
}

pub struct UserAuthMiddleware<S> {
    service: Rc<S>,
    public_paths: Rc<Vec<String>>,
}

/// 从 Authorization header 提取 Bearer token
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| {
            s.strip_prefix("Bearer ")
                .or_else(|| s.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

impl<S, B> Service<ServiceRequest> for UserAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let public_paths = self.public_paths.clone();

        Box::pin(async move {
            if req.method() == Method::OPTIONS
                || public_paths.iter().any(|p| p.as_str() == req.path())
            {
                trace!("Public endpoint {} - bypassing authentication", req.path());
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let Some(token) = extract_bearer_token(&req) else {
                debug!("Missing bearer token for {}", req.path());
                return Ok(req.into_response(unauthenticated_response().map_into_right_body()));
            };

            let Some(auth_service) = req.app_data::<web::Data<AuthService>>().cloned() else {
                error!("AuthService not registered in app data");
                return Ok(req.into_response(
                    HttpResponse::InternalServerError()
                        .json(json!({ "success": false, "message": "Error: authentication unavailable" }))
                        .map_into_right_body(),
                ));
            };

            match auth_service.authenticate(&token).await {
                Ok(user) => {
                    trace!("Authenticated user {}", user.id());
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(e) if e.http_status() == StatusCode::UNAUTHORIZED => {
                    debug!("Bearer authentication failed: {}", e.message());
                    Ok(req.into_response(unauthenticated_response().map_into_right_body()))
                }
                Err(e) => {
                    error!("Authentication error: {}", e);
                    Ok(req.into_response(
                        HttpResponse::InternalServerError()
                            .json(json!({ "success": false, "message": format!("Error: {}", e.message()) }))
                            .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

/// 未经中间件认证时提取失败
#[derive(Debug)]
pub struct Unauthenticated;

impl std::fmt::Display for Unauthenticated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(UNAUTHENTICATED_MESSAGE)
    }
}

impl ResponseError for Unauthenticated {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        unauthenticated_response()
    }
}

/// 当前请求的已认证用户
pub struct CurrentUser(pub AuthenticatedUser);

impl FromRequest for CurrentUser {
    type Error = Unauthenticated;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .map(CurrentUser)
                .ok_or(Unauthenticated),
        )
    }
}
