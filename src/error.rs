//! Error types for the cookie check pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that can occur while checking a cookie export.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Cookie file could not be read.
    #[error("Failed to read cookie file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cookie file content is malformed.
    #[error("Malformed cookie file: {0}")]
    Format(String),

    /// One or more required authentication cookies are absent.
    #[error("Missing critical authentication cookies: {}", .0.join(", "))]
    AuthCookieMissing(Vec<String>),

    /// Proxy address was rejected or the client could not be built with it.
    #[error("Invalid proxy configuration: {0}")]
    ProxyConfig(String),

    /// Direct credential verification failed.
    #[error("Cookie verification failed: {0}")]
    Verification(#[from] VerifyError),

    /// The session reported that it is not logged in.
    #[error("Login verification failed: {0}")]
    Login(String),

    /// The search stream yielded an error.
    #[error("Search failed: {0}")]
    Search(#[source] Box<CheckError>),

    /// Results could not be serialized.
    #[error("Failed to serialize results: {0}")]
    Serialization(#[source] serde_json::Error),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An API call answered with an unexpected status.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// Failed to parse an API response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Search request parameters are invalid.
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// Invocation parameters could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons the direct credential check can fail.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The ct0 cookie is missing or empty, so no CSRF header can be sent.
    #[error("ct0 cookie missing for verification")]
    CsrfMissing,

    /// The request never produced a response.
    #[error("verification request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The endpoint answered with something other than 200.
    #[error("status {status}, body: {body}")]
    Status { status: u16, body: String },
}
