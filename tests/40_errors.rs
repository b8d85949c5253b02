mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{app_with_config, authed, empty, error_of, json_body, send, test_config, TEST_API_KEY};
use serde_json::json;

/// Config whose pool can never connect, so every query fails fast
fn unreachable_db(expose: bool) -> dialer_admin_api::config::AppConfig {
    let mut config = test_config(TEST_API_KEY);
    config.database.host = "127.0.0.1".to_string();
    config.database.port = 1;
    config.api.expose_error_details = expose;
    config
}

#[tokio::test]
async fn database_failure_hides_cause_by_default() -> Result<()> {
    let app = app_with_config(unreachable_db(false))?;
    let res = send(app, empty(authed(Method::GET, "/api/v1/campaigns"))?).await?;

    assert_eq!(error_of(&res, StatusCode::INTERNAL_SERVER_ERROR)?, "Failed to retrieve campaigns");
    Ok(())
}

#[tokio::test]
async fn database_failure_names_cause_when_enabled() -> Result<()> {
    let app = app_with_config(unreachable_db(true))?;
    let res = send(app, empty(authed(Method::GET, "/api/v1/campaigns"))?).await?;

    let error = error_of(&res, StatusCode::INTERNAL_SERVER_ERROR)?;
    assert!(error.starts_with("Failed to retrieve campaigns: "), "{}", error);
    assert!(error.len() > "Failed to retrieve campaigns: ".len());
    Ok(())
}

#[tokio::test]
async fn oversized_form_body_is_413() -> Result<()> {
    let mut config = test_config(TEST_API_KEY);
    config.api.max_request_size_bytes = 64;
    let padding = "x".repeat(256);

    let request = Request::post("/api/v1/leads")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("api_key={}&comments={}", TEST_API_KEY, padding)))?;
    let res = send(app_with_config(config)?, request).await?;

    assert_eq!(error_of(&res, StatusCode::PAYLOAD_TOO_LARGE)?, "Request body too large");
    Ok(())
}

#[tokio::test]
async fn oversized_declared_form_body_is_413() -> Result<()> {
    let mut config = test_config(TEST_API_KEY);
    config.api.max_request_size_bytes = 64;
    let body = format!("api_key={}&comments={}", TEST_API_KEY, "y".repeat(256));

    let request = Request::post("/api/v1/leads")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))?;
    let res = send(app_with_config(config)?, request).await?;

    assert_eq!(error_of(&res, StatusCode::PAYLOAD_TOO_LARGE)?, "Request body too large");
    Ok(())
}

#[tokio::test]
async fn oversized_json_body_is_413() -> Result<()> {
    let mut config = test_config(TEST_API_KEY);
    config.api.max_request_size_bytes = 64;

    let request = json_body(
        authed(Method::POST, "/api/v1/leads"),
        json!({ "phone_number": "3125550100", "list_id": 101, "comments": "z".repeat(256) }),
    )?;
    let res = send(app_with_config(config)?, request).await?;

    assert_eq!(error_of(&res, StatusCode::PAYLOAD_TOO_LARGE)?, "Request body too large");
    Ok(())
}
