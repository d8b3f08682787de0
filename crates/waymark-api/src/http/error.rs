//! Application error type mapping to HTTP status codes and envelope
//! format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use waymark_types::error::RegistryError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Registry validation failures (reload or validate).
    Registry(Vec<RegistryError>),
    /// Malformed request payload.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            AppError::Registry(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                errors
                    .iter()
                    .map(|e| {
                        json!({
                            "code": "REGISTRY_INVALID",
                            "message": e.to_string(),
                        })
                    })
                    .collect::<Vec<_>>(),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                vec![json!({ "code": "VALIDATION_ERROR", "message": msg })],
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![json!({ "code": "INTERNAL_ERROR", "message": msg })],
            ),
        };

        let body = json!({
            "data": null,
            "errors": errors,
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
