//! Mapping of failures to HTTP responses
//!
//! Errors are only caught here, at the handler boundary. Validation
//! failures become 400; everything else becomes 500 with the full error
//! chain as the message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use mail::ConfigError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request input
    #[error("{0}")]
    Validation(String),

    /// Incomplete OAuth client configuration
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Any failure reported by or on the way to the mail provider
    #[error("{0:#}")]
    Provider(anyhow::Error),

    /// Backup directory or file could not be written
    #[error("{0:#}")]
    Filesystem(anyhow::Error),

    #[error("{0:#}")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn invalid_body() -> Self {
        Self::Validation("Invalid request body".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("{}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
