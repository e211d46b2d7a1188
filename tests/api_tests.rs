//! HTTP API integration tests
//!
//! 通过 `configure_app` 装配完整路由（认证中间件 + 健康检查），
//! provider 替换为 mock，存储使用临时 SQLite。

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use geolocator::api::jwt::JwtService;
use geolocator::api::middleware::RequestIdMiddleware;
use geolocator::runtime::lifetime::startup::{RouteConfig, StartupContext};
use geolocator::runtime::modes::configure_app;
use geolocator::services::{GeoLookup, ProviderError};
use geolocator::storage::{GeoData, HistoryStore, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

/// 可切换结果的 mock provider
struct SwitchProvider {
    failure: Mutex<Option<ProviderError>>,
}

impl SwitchProvider {
    fn new() -> Self {
        Self {
            failure: Mutex::new(None),
        }
    }

    fn fail_with(&self, err: ProviderError) {
        *self.failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl GeoLookup for SwitchProvider {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoData, ProviderError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let ip = ip.unwrap_or("203.0.113.7");
        match json!({
            "ip": ip,
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.3860,-122.0838",
            "timezone": "America/Los_Angeles"
        }) {
            Value::Object(map) => Ok(map),
            _ => unreachable!(),
        }
    }

    fn name(&self) -> &'static str {
        "switch"
    }
}

struct TestEnv {
    _dir: TempDir,
    ctx: StartupContext,
    provider: Arc<SwitchProvider>,
}

async fn setup() -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("api_test.db").display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );

    let provider = Arc::new(SwitchProvider::new());
    let jwt = Arc::new(JwtService::new("api-test-secret", 60));
    let ctx = StartupContext::assemble(
        storage,
        provider.clone(),
        jwt,
        RouteConfig {
            api_prefix: "/api".to_string(),
            health_prefix: "/health".to_string(),
        },
    );

    for (name, email) in [("Ada", "ada@example.com"), ("Bob", "bob@example.com")] {
        ctx.auth_service
            .create_user(name, email, "correct-horse")
            .await
            .expect("Failed to create user");
    }

    TestEnv {
        _dir: dir,
        ctx,
        provider,
    }
}

macro_rules! init_app {
    ($env:expr) => {{
        let ctx = $env.ctx.clone();
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .configure(move |cfg| configure_app(cfg, &ctx)),
        )
        .await
    }};
}

macro_rules! login_token {
    ($app:expr, $email:expr) => {{
        let req = TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": $email, "password": "correct-horse" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"]
            .as_str()
            .expect("login should return token")
            .to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

// =============================================================================
// Auth
// =============================================================================

#[actix_web::test]
async fn test_login_returns_bearer_token() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ada@example.com", "password": "correct-horse" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password").is_none());
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ada@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");

    let req = TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "not-an-email" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation error");
    assert_eq!(
        body["errors"]["email"],
        json!(["The email field must be a valid email address."])
    );
    assert_eq!(
        body["errors"]["password"],
        json!(["The password field is required."])
    );
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let env = setup().await;
    let app = init_app!(env);

    for req in [
        TestRequest::get().uri("/api/geolocation?ip=8.8.8.8"),
        TestRequest::get().uri("/api/history"),
        TestRequest::delete().uri("/api/history"),
        TestRequest::get().uri("/api/user"),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Unauthenticated." }));
    }

    let req = TestRequest::get()
        .uri("/api/history")
        .insert_header(bearer("garbage.token.value"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_revokes_token() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");

    let req = TestRequest::get()
        .uri("/api/user")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Ada");

    let req = TestRequest::post()
        .uri("/api/logout")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logged out successfully");

    let req = TestRequest::get()
        .uri("/api/user")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Geolocation
// =============================================================================

#[actix_web::test]
async fn test_lookup_with_ip_creates_history() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");

    let req = TestRequest::get()
        .uri("/api/geolocation?ip=8.8.8.8")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["ip"], "8.8.8.8");
    assert_eq!(body["data"]["city"], "Mountain View");

    let req = TestRequest::get()
        .uri("/api/history")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["ip_address"], "8.8.8.8");
    assert_eq!(history[0]["geo_data"]["city"], "Mountain View");
    assert!(history[0]["created_at"].as_str().unwrap().ends_with('Z'));
}

#[actix_web::test]
async fn test_self_lookup_does_not_create_history() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");

    for uri in ["/api/geolocation", "/api/geolocation?ip=", "/api/geolocation?ip=%20%20"] {
        let req = TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["ip"], "203.0.113.7");
    }

    let history = env.ctx.history.list_history_by_owner(1).await.unwrap();
    assert!(history.is_empty());
}

#[actix_web::test]
async fn test_duplicate_ip_param_uses_last_value() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");

    let req = TestRequest::get()
        .uri("/api/geolocation?ip=8.8.8.8&ip=1.1.1.1")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["ip"], "1.1.1.1");

    let history = env.ctx.history.list_history_by_owner(1).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].ip_address, "1.1.1.1");
}

#[actix_web::test]
async fn test_provider_failure_returns_400() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");
    env.provider.fail_with(ProviderError::Status(503));

    let req = TestRequest::get()
        .uri("/api/geolocation?ip=8.8.8.8")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "success": false, "message": "Failed to fetch geolocation data" })
    );

    let req = TestRequest::get()
        .uri("/api/history")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn test_provider_internal_error_returns_500() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");
    env.provider
        .fail_with(ProviderError::Internal("task panicked".to_string()));

    let req = TestRequest::get()
        .uri("/api/geolocation?ip=8.8.8.8")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Error: task panicked");
}

// =============================================================================
// History
// =============================================================================

#[actix_web::test]
async fn test_history_is_per_user() {
    let env = setup().await;
    let app = init_app!(env);
    let ada = login_token!(app, "ada@example.com");
    let bob = login_token!(app, "bob@example.com");

    for (token, ip) in [(&ada, "8.8.8.8"), (&ada, "1.1.1.1"), (&bob, "9.9.9.9")] {
        let req = TestRequest::get()
            .uri(&format!("/api/geolocation?ip={}", ip))
            .insert_header(bearer(token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = TestRequest::get()
        .uri("/api/history")
        .insert_header(bearer(&ada))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let ips: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["ip_address"].as_str().unwrap())
        .collect();
    assert_eq!(ips, vec!["1.1.1.1", "8.8.8.8"]);
}

#[actix_web::test]
async fn test_delete_only_own_history() {
    let env = setup().await;
    let app = init_app!(env);
    let ada = login_token!(app, "ada@example.com");

    let own = env
        .ctx
        .history
        .insert_history(1, "8.8.8.8", &GeoData::new())
        .await
        .unwrap();
    let foreign = env
        .ctx
        .history
        .insert_history(2, "9.9.9.9", &GeoData::new())
        .await
        .unwrap();

    let req = TestRequest::delete()
        .uri("/api/history")
        .insert_header(bearer(&ada))
        .set_json(json!({ "ids": [own.id, foreign.id.to_string()] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "History deleted successfully");
    assert_eq!(body["deleted_count"], 1);

    assert_eq!(env.ctx.history.list_history_by_owner(2).await.unwrap().len(), 1);
    assert!(env.ctx.history.list_history_by_owner(1).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_validation_errors() {
    let env = setup().await;
    let app = init_app!(env);
    let ada = login_token!(app, "ada@example.com");

    let req = TestRequest::delete()
        .uri("/api/history")
        .insert_header(bearer(&ada))
        .set_json(json!({ "ids": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation error");
    assert_eq!(body["errors"]["ids"], json!(["The ids field is required."]));
    assert_eq!(body["errors"].as_object().unwrap().len(), 1);

    let req = TestRequest::delete()
        .uri("/api/history")
        .insert_header(bearer(&ada))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["ids"], json!(["The ids field is required."]));

    let req = TestRequest::delete()
        .uri("/api/history")
        .insert_header(bearer(&ada))
        .set_json(json!({ "ids": [424242, "abc"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["errors"]["ids.0"],
        json!(["The selected ids.0 is invalid."])
    );
    assert_eq!(
        body["errors"]["ids.1"],
        json!(["The ids.1 field must be an integer.", "The selected ids.1 is invalid."])
    );
}

#[actix_web::test]
async fn test_oversized_delete_body_returns_json_413() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login_token!(app, "ada@example.com");

    let ids: Vec<String> = (0..20_000).map(|i| i.to_string()).collect();
    let payload = format!("{{\"ids\":[{}]}}", ids.join(","));
    assert!(payload.len() > 64 * 1024);

    let req = TestRequest::delete()
        .uri("/api/history")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json; charset=utf-8"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Error deleting history: ")
    );
}

// =============================================================================
// Health
// =============================================================================

#[actix_web::test]
async fn test_health_endpoints_are_public() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["storage"]["backend"], "sqlite");

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_request_id_is_echoed() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::get()
        .uri("/health/live")
        .insert_header(("X-Request-ID", "trace-42"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-42");

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
