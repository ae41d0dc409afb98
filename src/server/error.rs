//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<T, AppError>`; any [`marquee_common::Error`] converts
//! with `?` and renders as `{"error": "..."}` with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marquee_common::Error;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        Self(Error::not_found(entity))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(Error::invalid_input(msg))
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
