// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized, with a machine-readable reason and a human hint
    Unauthorized { error: String, message: String },

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 413 Payload Too Large
    PayloadTooLarge,

    // 500 raised by the auth gate when no secret is configured
    NotConfigured { error: String, message: String },

    // 500 Internal Server Error; `detail` never reaches the body directly
    InternalServerError { context: String, detail: Option<String> },
}

/// Cause of a 500, attached to the response as an extension so the router
/// can decide per deployment whether the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalErrorDetail {
    pub context: String,
    pub detail: String,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotConfigured { .. } | ApiError::InternalServerError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get client-safe error string
    pub fn error(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized { error, .. } => error,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::PayloadTooLarge => "Request body too large",
            ApiError::NotConfigured { error, .. } => error,
            ApiError::InternalServerError { context, .. } => context,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Unauthorized { error, message } | ApiError::NotConfigured { error, message } => {
                json!({
                    "success": false,
                    "error": error,
                    "message": message
                })
            }
            _ => json!({
                "success": false,
                "error": self.error()
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn not_configured(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NotConfigured {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Build a 500 from a lower-level failure. The cause is always logged;
    /// the body carries only `context` unless the router opts in to details.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::InternalServerError {
            context: context.to_string(),
            detail: Some(err.to_string()),
        }
    }
}

impl InternalErrorDetail {
    pub fn message(&self) -> String {
        format!("{}: {}", self.context, self.detail)
    }
}

impl IntoResponse for InternalErrorDetail {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": self.message()
            })),
        )
            .into_response()
    }
}

/// Attach a client-facing context to any displayable error, yielding a 500.
pub trait ResultExt<T> {
    fn or_internal(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn or_internal(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::internal(context, err))
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        ApiError::internal("Database error", err)
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_json())).into_response();
        if let ApiError::InternalServerError {
            context,
            detail: Some(detail),
        } = self
        {
            response
                .extensions_mut()
                .insert(InternalErrorDetail { context, detail });
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_carries_reason_and_message() {
        let err = ApiError::unauthorized("Authentication failed", "Invalid API key");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authentication failed");
        assert_eq!(body["message"], "Invalid API key");
    }

    #[test]
    fn plain_errors_omit_message_and_data() {
        let body = ApiError::not_found("Lead not found").to_json();
        assert_eq!(body["error"], "Lead not found");
        assert!(body.get("message").is_none());
        assert!(body.get("data").is_none());
    }

    #[test]
    fn internal_body_omits_cause_but_response_carries_it() {
        let err = ApiError::internal("Failed to retrieve campaigns", "pool timed out");
        assert_eq!(err.to_json()["error"], "Failed to retrieve campaigns");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<InternalErrorDetail>().cloned().unwrap();
        assert_eq!(detail.message(), "Failed to retrieve campaigns: pool timed out");
    }

    #[test]
    fn oversized_body_maps_to_413() {
        let err = ApiError::PayloadTooLarge;
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_json()["error"], "Request body too large");
    }

    #[test]
    fn method_not_allowed_maps_to_405() {
        let err = ApiError::MethodNotAllowed;
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.error(), "Method not allowed");
    }
}
