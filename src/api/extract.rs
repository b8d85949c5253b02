use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor that answers malformed input with the API envelope.
///
/// The content type is not checked; clients of the dialer API routinely
/// send JSON with form or missing content types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::invalid_json("Invalid request payload")
            }
        })?;

        serde_json::from_slice(&bytes).map(ApiJson).map_err(|e| {
            tracing::debug!("rejected request body: {}", e);
            ApiError::invalid_json("Invalid request payload")
        })
    }
}

/// Query-string extractor with an envelope rejection
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| ApiQuery(value))
            .map_err(|e| {
                tracing::debug!("rejected query string: {}", e);
                ApiError::bad_request("Invalid query parameters")
            })
    }
}

/// Parse a numeric path segment, answering 400 with `message` otherwise
pub fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(message))
}

/// Row limit from the query string; blank means `default`
pub fn parse_limit(raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ApiError::bad_request("Invalid limit parameter")),
    }
}

/// Value or default when absent or blank
pub fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Filters {
        status: Option<String>,
        limit: Option<i64>,
    }

    async fn extract(uri: &str) -> Result<Filters, ApiError> {
        let uri: Uri = uri.parse().unwrap();
        let (mut parts, _) = axum::http::Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        ApiQuery::<Filters>::from_request_parts(&mut parts, &())
            .await
            .map(|ApiQuery(f)| f)
    }

    #[tokio::test]
    async fn parses_query_string() {
        let f = extract("/x?status=SALE&limit=5").await.unwrap();
        assert_eq!(f.status.as_deref(), Some("SALE"));
        assert_eq!(f.limit, Some(5));
    }

    #[tokio::test]
    async fn rejects_bad_numeric_query() {
        let err = extract("/x?limit=ten").await.unwrap_err();
        assert_eq!(err.error(), "Invalid query parameters");
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("42", "Invalid lead ID").unwrap(), 42);
        let err = parse_id("4x2", "Invalid lead ID").unwrap_err();
        assert_eq!(err.error(), "Invalid lead ID");
    }

    #[test]
    fn limit_defaults_and_validates() {
        assert_eq!(parse_limit(None, 100).unwrap(), 100);
        assert_eq!(parse_limit(Some(""), 50).unwrap(), 50);
        assert_eq!(parse_limit(Some("25"), 100).unwrap(), 25);
        assert!(parse_limit(Some("0"), 100).is_err());
        assert!(parse_limit(Some("1; DROP"), 100).is_err());
    }

    #[test]
    fn or_default_treats_blank_as_missing() {
        assert_eq!(or_default(Some(String::new()), "Y"), "Y");
        assert_eq!(or_default(Some("N".into()), "Y"), "N");
        assert_eq!(or_default(None, "1"), "1");
    }
}
