//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the production middleware stack
//! (CORS, request ID, timeout, tracing, panic recovery) over a test
//! database pool and a stub OCR client, so tests exercise the same request
//! path production uses.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use repliq_api::auth::jwt::{generate_access_token, JwtConfig};
use repliq_api::auth::password::hash_password;
use repliq_api::config::{OcrConfig, ServerConfig};
use repliq_api::routes;
use repliq_api::state::AppState;
use repliq_core::roles::Role;
use repliq_core::types::DbId;
use repliq_db::models::user::CreateUser;
use repliq_db::repositories::{AllowlistRepo, UserRepo};
use repliq_ocr::{OcrClient, OcrError};

/// OCR text used when a test does not care about the receipt content.
/// Contains one plausible line item and one reserved line.
pub const DEFAULT_RECEIPT_TEXT: &str = "LE PETIT PRINCE 8,90\nTOTAL 8,90";

/// Stub OCR client returning a canned outcome.
pub struct StubOcrClient {
    text: Option<String>,
}

impl StubOcrClient {
    /// Always succeeds with the given text.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    /// Always fails, simulating an unreachable OCR service.
    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait::async_trait]
impl OcrClient for StubOcrClient {
    async fn extract_text(&self, _image_base64: &str, _language: &str) -> Result<String, OcrError> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(OcrError::Connection("stubbed OCR outage".to_string())),
        }
    }
}

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        ocr: OcrConfig {
            base_url: "http://localhost:8600".to_string(),
            language: "fra".to_string(),
        },
    }
}

/// Build the application router with the default stub OCR client.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_ocr(pool, Arc::new(StubOcrClient::with_text(DEFAULT_RECEIPT_TEXT)))
}

/// Build the application router with a specific OCR client.
pub fn build_test_app_with_ocr(pool: PgPool, ocr: Arc<dyn OcrClient>) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        config: Arc::new(config),
        ocr,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// User fixtures
// ---------------------------------------------------------------------------

/// Create a user directly in the database, returning its id. The password
/// is always `test_password_123!`.
pub async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    let hashed = hash_password("test_password_123!").expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: hashed,
        },
    )
    .await
    .expect("user creation should succeed");
    user.id
}

/// Create a user and allowlist their email, returning the id.
pub async fn seed_admin(pool: &PgPool, email: &str) -> DbId {
    AllowlistRepo::insert(pool, email)
        .await
        .expect("allowlist insert should succeed");
    seed_user(pool, email).await
}

/// Mint an access token for a seeded user without going through login.
pub fn token_for(user_id: DbId, email: &str, role: Role) -> String {
    generate_access_token(user_id, email, role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body, without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a bodyless POST request with a Bearer token (approve/reject).
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body and a Bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
