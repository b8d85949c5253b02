use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

const DEFAULT_CALLER_LABEL: &str = "api-key";

/// Caller-supplied label (`X-User` header, `user` query or form field).
///
/// This is NOT a verified identity. The shared secret proves the caller may
/// use the API at all; the label is whatever the caller chose to send and is
/// only echoed back or written to audit columns. Never use it for access
/// decisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerLabel(pub String);

/// Credential material pulled from one request
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub caller_label: Option<String>,
}

/// Shared-secret gate for every route under the versioned prefix.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = &state.config.api.api_key;
    if expected.is_empty() {
        tracing::error!("API_KEY is not configured; rejecting request");
        return Err(ApiError::not_configured(
            "Authentication not configured",
            "Missing API_KEY in environment",
        ));
    }

    let (parts, body) = request.into_parts();

    // Form bodies are buffered so the handler can still read them afterwards
    let (form, body) = if is_form_body(&parts.headers) {
        let limit = state.config.api.max_request_size_bytes;
        if declared_length(&parts.headers).is_some_and(|len| len > limit) {
            return Err(ApiError::PayloadTooLarge);
        }
        let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
            if is_length_limit(e) {
                ApiError::PayloadTooLarge
            } else {
                ApiError::bad_request("Invalid request payload")
            }
        })?;
        (Some(bytes.clone()), Body::from(bytes))
    } else {
        (None, body)
    };

    let credentials = extract_credentials(&parts.headers, parts.uri.query(), form.as_deref());

    let provided = credentials.api_key.ok_or_else(|| {
        ApiError::unauthorized(
            "Authentication required",
            "Missing API key (use header X-API-Key or query param api_key)",
        )
    })?;

    if provided != *expected {
        tracing::warn!(path = %parts.uri.path(), "rejected request with invalid API key");
        return Err(ApiError::unauthorized("Authentication failed", "Invalid API key"));
    }

    let label = credentials
        .caller_label
        .unwrap_or_else(|| DEFAULT_CALLER_LABEL.to_string());

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(CallerLabel(label));

    Ok(next.run(request).await)
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn is_length_limit(err: axum::Error) -> bool {
    err.into_inner()
        .downcast_ref::<http_body_util::LengthLimitError>()
        .is_some()
}

/// Resolve the secret and caller label in precedence order: header, query, form.
pub fn extract_credentials(headers: &HeaderMap, query: Option<&str>, form: Option<&[u8]>) -> Credentials {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let lookup = |source: Option<&[u8]>, key: &str| {
        source.and_then(|bytes| {
            url::form_urlencoded::parse(bytes)
                .find(|(k, v)| k == key && !v.is_empty())
                .map(|(_, v)| v.into_owned())
        })
    };
    let query = query.map(str::as_bytes);

    Credentials {
        api_key: header("x-api-key")
            .or_else(|| lookup(query, "api_key"))
            .or_else(|| lookup(form, "api_key")),
        caller_label: header("x-user")
            .or_else(|| lookup(query, "user"))
            .or_else(|| lookup(form, "user")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_wins_over_query_and_form() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static("from-header"));

        let creds = extract_credentials(
            &headers,
            Some("api_key=from-query"),
            Some(b"api_key=from-form".as_slice()),
        );
        assert_eq!(creds.api_key.as_deref(), Some("from-header"));
    }

    #[test]
    fn query_wins_over_form() {
        let creds = extract_credentials(
            &HeaderMap::new(),
            Some("foo=1&api_key=from-query&user=alice"),
            Some(b"api_key=from-form&user=bob".as_slice()),
        );
        assert_eq!(creds.api_key.as_deref(), Some("from-query"));
        assert_eq!(creds.caller_label.as_deref(), Some("alice"));
    }

    #[test]
    fn form_is_last_resort() {
        let creds = extract_credentials(&HeaderMap::new(), None, Some(b"api_key=s%20ecret&user=ops".as_slice()));
        assert_eq!(creds.api_key.as_deref(), Some("s ecret"));
        assert_eq!(creds.caller_label.as_deref(), Some("ops"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", HeaderValue::from_static(""));
        let creds = extract_credentials(&headers, Some("api_key="), None);
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn label_header_is_read() {
        let mut headers = HeaderMap::new();
        headers.insert("X-User", HeaderValue::from_static("supervisor"));
        let creds = extract_credentials(&headers, None, None);
        assert_eq!(creds.caller_label.as_deref(), Some("supervisor"));
        assert!(creds.api_key.is_none());
    }
}
