//! Error types for the relay service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced by configuration, signing, and storage calls.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The account key is not valid base64.
    #[error("account key is not valid base64: {0}")]
    InvalidAccountKey(#[from] base64::DecodeError),

    /// HTTP transport failure talking to a storage service.
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A storage service rejected the request.
    #[error("{operation} failed: HTTP {status}: {body}")]
    Service {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A storage service returned a response body we could not decode.
    #[error("could not decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    /// A request URL could not be constructed.
    #[error("invalid request url: {0}")]
    Url(String),
}

impl RelayError {
    /// Builds a `Service` error from a storage response.
    pub fn service(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Service {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Builds a `Decode` error.
    pub fn decode(operation: &'static str, message: impl ToString) -> Self {
        Self::Decode {
            operation,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // Endpoint handlers define no error contract of their own; any
        // storage fault surfaces as a plain 500 with the error text, the
        // hosting layer's default.
        tracing::error!("request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
