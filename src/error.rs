//! Error types for the fetch relay
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Relay Error Enum ==
/// Unified error type for the fetch relay.
///
/// The enum is `Clone` because a single operation outcome is fanned out to
/// every coalesced waiter over a broadcast channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    /// Invalid component parameters (e.g. zero row height)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Underlying fetch operation failed; payload is opaque to the cache
    #[error("Operation failed: {0}")]
    Operation(String),

    /// Snapshot load/save failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RelayError::Configuration(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            RelayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            RelayError::Operation(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            RelayError::Persistence(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            RelayError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fetch relay.
pub type Result<T> = std::result::Result<T, RelayError>;
