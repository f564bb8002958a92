//! Error types for the gateway

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use nvim_http_core::RpcError;
use serde_json::Value;
use thiserror::Error;

/// Gateway errors. Each one ends the request it was raised for.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Malformed path {path}: {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("Invalid query parameters string: {0}")]
    MalformedQuery(String),

    #[error("Unknown function: {0}")]
    UnknownProcedure(String),

    #[error("Required argument not found: {0}")]
    MissingArgument(String),

    #[error("Expected {expected} arguments, but found {found}")]
    ArgumentCountMismatch { expected: usize, found: usize },

    #[error("Body should be an object!")]
    InvalidBodyShape,

    /// Structured error returned by the editor
    #[error("{0}")]
    Remote(Value),

    #[error("{0}")]
    Transport(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Starting server failed: {0}")]
    Startup(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub(crate) fn malformed_path(path: &str, reason: impl Into<String>) -> Self {
        GatewayError::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MalformedPath { .. }
            | GatewayError::MalformedQuery(_)
            | GatewayError::MissingArgument(_)
            | GatewayError::ArgumentCountMismatch { .. }
            | GatewayError::InvalidBodyShape
            | GatewayError::Remote(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownProcedure(_) => StatusCode::NOT_FOUND,
            GatewayError::Transport(_)
            | GatewayError::Timeout(_)
            | GatewayError::Startup(_)
            | GatewayError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RpcError> for GatewayError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Remote(payload) => GatewayError::Remote(payload),
            RpcError::Transport(msg) => GatewayError::Transport(msg),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // The remote payload goes back as JSON, everything else as text
            GatewayError::Remote(payload) => match serde_json::to_vec(&payload) {
                Ok(body) => json_response(status, body),
                Err(err) => text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            },
            other => text_response(status, other.to_string()),
        }
    }
}

pub(crate) fn text_response(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

pub(crate) fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
