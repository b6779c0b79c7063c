//! Error types for the widget.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to complete an HTTP round trip at all.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client error (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend refused or dropped the connection.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Why a submission did not produce an answer.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Backend answered 429.
    #[error("Rate limited by backend")]
    RateLimited,

    /// Backend answered with another non-success status.
    #[error("Backend error ({status}): {body}")]
    RequestFailed {
        /// HTTP status code.
        status: StatusCode,
        /// Response body, kept for diagnostics only.
        body: String,
    },

    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Success status but the body was not a valid chat response.
    #[error("Malformed response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// No reply within the configured bound.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The in-flight request was cancelled.
    #[error("Request cancelled")]
    Cancelled,
}
