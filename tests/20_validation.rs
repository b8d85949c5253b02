//! Request validation that answers before any query reaches the database.

mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, StatusCode},
};
use common::{authed, empty, error_of, json_body, send, test_app, TEST_API_KEY};
use serde_json::json;

async fn get_error(uri: &str) -> Result<String> {
    let res = send(test_app(TEST_API_KEY)?, empty(authed(Method::GET, uri))?).await?;
    error_of(&res, StatusCode::BAD_REQUEST)
}

async fn json_error(method: Method, uri: &str, body: serde_json::Value) -> Result<String> {
    let res = send(test_app(TEST_API_KEY)?, json_body(authed(method, uri), body)?).await?;
    error_of(&res, StatusCode::BAD_REQUEST)
}

#[tokio::test]
async fn malformed_json_is_invalid_payload() -> Result<()> {
    let request = authed(Method::POST, "/api/v1/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"phone_number\": "))?;
    let res = send(test_app(TEST_API_KEY)?, request).await?;

    assert_eq!(error_of(&res, StatusCode::BAD_REQUEST)?, "Invalid request payload");
    Ok(())
}

#[tokio::test]
async fn lead_add_requires_phone_and_list() -> Result<()> {
    let err = json_error(Method::POST, "/api/v1/leads", json!({ "first_name": "Ada" })).await?;
    assert_eq!(err, "Phone number and list ID are required");

    let err = json_error(Method::POST, "/api/v1/leads", json!({ "phone_number": "3125550100" })).await?;
    assert_eq!(err, "Phone number and list ID are required");
    Ok(())
}

#[tokio::test]
async fn batch_update_requires_ids() -> Result<()> {
    let err = json_error(Method::PUT, "/api/v1/leads/batch", json!({ "status": "DNC" })).await?;
    assert_eq!(err, "No lead IDs provided");
    Ok(())
}

#[tokio::test]
async fn lead_id_must_be_numeric() -> Result<()> {
    assert_eq!(get_error("/api/v1/leads/abc/info").await?, "Invalid lead ID");
    Ok(())
}

#[tokio::test]
async fn field_info_uses_allow_list() -> Result<()> {
    assert_eq!(
        get_error("/api/v1/leads/7/field-info").await?,
        "Field parameter is required"
    );
    assert_eq!(
        get_error("/api/v1/leads/7/field-info?field=password").await?,
        "Invalid field name"
    );
    assert_eq!(
        get_error("/api/v1/leads/7/field-info?field=status%3B%20DROP%20TABLE%20vicidial_list").await?,
        "Invalid field name"
    );
    Ok(())
}

#[tokio::test]
async fn search_parameters_are_required() -> Result<()> {
    assert_eq!(get_error("/api/v1/leads/status-search").await?, "Status parameter is required");
    assert_eq!(get_error("/api/v1/phone/check").await?, "Phone number is required");
    Ok(())
}

#[tokio::test]
async fn kpi_group_by_is_validated() -> Result<()> {
    assert_eq!(
        get_error("/api/v1/kpi/dispositions?group_by=user").await?,
        "Invalid group_by parameter. Use 'list', 'campaign', or 'both'"
    );
    Ok(())
}

#[tokio::test]
async fn log_limits_must_be_positive_numbers() -> Result<()> {
    assert_eq!(get_error("/api/v1/sip/carrier-log?limit=lots").await?, "Invalid limit parameter");
    assert_eq!(get_error("/api/v1/sip/event-log?limit=0").await?, "Invalid limit parameter");
    assert_eq!(get_error("/api/v1/test-call/list?limit=-3").await?, "Invalid limit parameter");
    Ok(())
}

#[tokio::test]
async fn hopper_bulk_requires_ids() -> Result<()> {
    let err = json_error(
        Method::POST,
        "/api/v1/campaigns/SALES/hopper/bulk",
        json!({ "lead_ids": [] }),
    )
    .await?;
    assert_eq!(err, "No lead IDs provided");
    Ok(())
}

#[tokio::test]
async fn test_call_send_validation() -> Result<()> {
    let uri = "/api/v1/test-call/send";
    assert_eq!(
        json_error(Method::POST, uri, json!({ "phone_number": "3125550100" })).await?,
        "campaign_id is required"
    );
    assert_eq!(
        json_error(Method::POST, uri, json!({ "campaign_id": "SALES" })).await?,
        "phone_number is required"
    );
    assert_eq!(
        json_error(Method::POST, uri, json!({ "campaign_id": "SALES", "phone_number": "12345" })).await?,
        "phone_number too small, must be at least 6 digits"
    );
    Ok(())
}

#[tokio::test]
async fn test_call_status_requires_caller_code() -> Result<()> {
    assert_eq!(get_error("/api/v1/test-call/status").await?, "caller_code is required");
    Ok(())
}

#[tokio::test]
async fn required_body_fields() -> Result<()> {
    assert_eq!(
        json_error(Method::POST, "/api/v1/lists", json!({ "list_id": 101 })).await?,
        "List name is required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/users", json!({ "user": "1001" })).await?,
        "Username and password are required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/users/1001/copy", json!({ "new_user": "1002" })).await?,
        "New username and password are required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/phones", json!({ "login": "gs102" })).await?,
        "Extension is required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/dids", json!({ "did_description": "main" })).await?,
        "DID pattern is required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/dnc", json!({ "campaign_id": "SALES" })).await?,
        "Phone number is required"
    );
    assert_eq!(
        json_error(Method::POST, "/api/v1/fpg", json!({ "phone_number": "3125550100" })).await?,
        "Phone number and filter group ID are required"
    );
    Ok(())
}
