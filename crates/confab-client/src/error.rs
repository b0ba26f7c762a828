//! Error types for confab-client

use thiserror::Error;

/// Result type alias using confab-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the generation endpoint.
///
/// The failure kinds are kept distinct internally, but callers that
/// only need a human-readable description can rely on `Display`.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connection failure, DNS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded a configured timeout
    #[error("request timed out")]
    Timeout,

    /// Server returned a non-2xx status
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be deserialized
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL could not be parsed or used
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Error {
    /// Whether this error was caused by a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}
