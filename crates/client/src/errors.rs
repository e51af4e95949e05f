//! Client error types
//!
//! Error classification for CMS client operations. All errors surface
//! synchronously to the immediate caller; there is no internal retry or
//! suppression. Path-resolution misses are `Ok(None)`, not errors.

use thiserror::Error;

/// CMS client operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing base URL, missing auth credentials, or auth not configured
    /// for a call that requires it
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-success response from the OAuth token endpoint
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The JSON:API index has no entry for the requested type/locale
    #[error("Resource type not found: {0}")]
    ResourceTypeNotFound(String),

    /// Non-success HTTP response or transport failure
    #[error("Request error: {0}")]
    Request(String),

    /// Response body carried a JSON:API `errors` array
    #[error("JSON:API error: {0}")]
    JsonApi(String),

    /// An entity expected to carry an attribute did not
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),
}

impl ClientError {
    /// The classified message without the variant prefix.
    ///
    /// For JSON:API errors this is the formatted first-entry message,
    /// e.g. `"404 Not Found"`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Auth(msg)
            | Self::ResourceTypeNotFound(msg)
            | Self::Request(msg)
            | Self::JsonApi(msg)
            | Self::MissingAttribute(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {err}"))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
