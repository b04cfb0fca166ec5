//! Error types for the HTTP adapter

use thiserror::Error;
use threadline_application::GatewayError;

/// Result type alias for HTTP adapter operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors raised while talking to the chat service over HTTP
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

impl From<HttpError> for GatewayError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) if e.is_connect() || e.is_timeout() => {
                GatewayError::ConnectionError(e.to_string())
            }
            HttpError::Request(e) if e.is_decode() => GatewayError::InvalidResponse(e.to_string()),
            HttpError::Request(e) if e.is_body() => GatewayError::StreamInterrupted(e.to_string()),
            HttpError::Request(e) => GatewayError::Other(e.to_string()),
            HttpError::Serialization(e) => GatewayError::InvalidResponse(e.to_string()),
            HttpError::InvalidUrl(url) => GatewayError::Other(format!("invalid service URL: {url}")),
        }
    }
}
