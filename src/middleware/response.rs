use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub warnings: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with data only
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            warnings: Vec::new(),
        }
    }

    /// Successful response carrying a human-readable message alongside the data
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    /// Success with only a message and no payload
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            warnings: Vec::new(),
        }
    }

    /// Attach non-fatal failures that did not abort the request
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = Map::new();
        envelope.insert("success".to_string(), Value::Bool(true));

        if let Some(message) = self.message {
            envelope.insert("message".to_string(), Value::String(message));
        }

        if let Some(data) = self.data {
            // Convert data to JSON Value for consistent envelope format
            match serde_json::to_value(&data) {
                Ok(value) => {
                    envelope.insert("data".to_string(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "error": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }

        if !self.warnings.is_empty() {
            envelope.insert("warnings".to_string(), json!(self.warnings));
        }

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_includes_message_and_data() {
        let response = ApiResponse::with_message("Lead updated successfully", json!({"lead_id": 7}))
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Lead updated successfully");
        assert_eq!(body["data"]["lead_id"], 7);
        assert!(body.get("warnings").is_none());
    }

    #[tokio::test]
    async fn message_only_omits_data() {
        let body = body_json(ApiResponse::<()>::message_only("Phone number already in DNC list").into_response()).await;
        assert_eq!(body["success"], true);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn warnings_are_emitted_when_present() {
        let response = ApiResponse::success(json!([]))
            .with_warnings(vec!["dial log insert failed".to_string()])
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["warnings"][0], "dial log insert failed");
    }
}
