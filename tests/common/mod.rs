#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dialer_admin_api::config::AppConfig;
use dialer_admin_api::database::DatabaseManager;
use sqlx::MySqlPool;
use dialer_admin_api::{app, AppState};

pub const TEST_API_KEY: &str = "test-secret";

/// Default (production) settings with the given secret and a pool that never
/// dials out on its own.
pub fn test_config(api_key: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.api_key = api_key.to_string();
    config.database.min_connections = 0;
    config.database.acquire_timeout_secs = 1;
    config
}

/// Router backed by a lazily connected pool; only paths that reach a query
/// need a database.
pub fn test_app(api_key: &str) -> Result<Router> {
    app_with_config(test_config(api_key))
}

pub fn app_with_config(config: AppConfig) -> Result<Router> {
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    Ok(app(AppState::new(pool, config)))
}

fn live_config() -> Result<AppConfig> {
    let url = std::env::var("TEST_DATABASE_URL")?;
    let mut config = test_config(TEST_API_KEY);
    config.database.apply_url(&url)?;
    Ok(config)
}

/// Router against a live dialer schema named by `TEST_DATABASE_URL`
pub async fn live_app() -> Result<Router> {
    let config = live_config()?;
    let pool = DatabaseManager::connect(&config.database).await?;
    Ok(app(AppState::new(pool, config)))
}

/// Direct pool on the same schema, for fixtures the API cannot create
pub async fn live_pool() -> Result<MySqlPool> {
    Ok(DatabaseManager::connect(&live_config()?.database).await?)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Result<TestResponse> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec())?,
    })
}

/// Request carrying the test secret in `X-API-Key`
pub fn authed(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-Key", TEST_API_KEY)
}

pub fn json_body(builder: axum::http::request::Builder, body: Value) -> Result<Request<Body>> {
    Ok(builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

pub fn empty(builder: axum::http::request::Builder) -> Result<Request<Body>> {
    Ok(builder.body(Body::empty())?)
}

/// Assert a failure envelope and return its `error` text
pub fn error_of(response: &TestResponse, status: StatusCode) -> Result<String> {
    assert_eq!(response.status, status, "body: {}", response.text);
    let body = response.json()?;
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
    Ok(body["error"].as_str().unwrap_or_default().to_string())
}
