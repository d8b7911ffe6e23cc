/*
[INPUT]:  Error sources (transport, HTTP status, serialization, local IO)
[OUTPUT]: Structured error types with context for the caller
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Specwise API client
#[derive(Error, Debug)]
pub enum SpecwiseError {
    /// Transport failure (connect, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response parsed but did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reading a local file for upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpecwiseError {
    /// Network-level failure, as opposed to a server answer
    pub fn is_transport(&self) -> bool {
        matches!(self, SpecwiseError::Http(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SpecwiseError::Api { code: 404, .. })
    }

    /// HTTP status of an API error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SpecwiseError::Api { code, .. } => Some(*code),
            SpecwiseError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        SpecwiseError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for Specwise operations
pub type Result<T> = std::result::Result<T, SpecwiseError>;
