//! Error types for the CSRF session client
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! the [`Error`] enum below.

use serde_json::Value;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level HTTP failures (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A header name or value could not be encoded
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader {
        /// The offending header name
        name: String,
        /// Why it was rejected
        message: String,
    },

    /// The API answered with a non-success status
    #[error("API request failed with status {status}")]
    Api {
        /// Numeric HTTP status code
        status: u16,
        /// Response body parsed as JSON, or an empty object when it was not JSON
        body: Value,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Validation errors
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Error message describing the validation failure
        message: String,
        /// The invalid value that caused the validation to fail
        value: Option<String>,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an API error from a status and raw body bytes.
    ///
    /// The body is parsed as JSON on a best-effort basis; anything that is not
    /// valid JSON becomes an empty object. This never fails.
    pub fn api(status: u16, body: &[u8]) -> Self {
        let body =
            serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
        Self::Api { status, body }
    }

    /// Create a configuration error
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a validation error that records the rejected value
    pub fn validation_with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: Some(value.into()),
        }
    }

    /// HTTP status carried by an [`Error::Api`], if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Parsed body carried by an [`Error::Api`], if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            Error::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    ///
    /// Only transport hiccups and server-side failures qualify. The client
    /// itself never retries on these; callers may.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "http",
            Error::Json(..) => "json",
            Error::Toml(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::InvalidHeader { .. } => "header",
            Error::Api { .. } => "api",
            Error::Config { .. } => "config",
            Error::Validation { .. } => "validation",
        }
    }
}
