//! Error-to-response mapping for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ForesightError;

/// Wrapper giving `ForesightError` an HTTP representation
#[derive(Debug)]
pub struct ApiError(pub ForesightError);

impl From<ForesightError> for ApiError {
    fn from(e: ForesightError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ForesightError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ForesightError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ForesightError::Training(msg) => {
                tracing::error!(detail = %msg, "training error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Training failed: {}", msg),
                )
            }
            ForesightError::Storage(msg) => {
                tracing::error!(detail = %msg, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
            ForesightError::Serialization(e) => {
                tracing::error!(detail = %e, "serialization error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
