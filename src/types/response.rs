//! Response type definitions
//!
//! The client buffers every response body once into a [`ResponseSnapshot`],
//! so the failure classifier can inspect it and the caller still receives the
//! same bytes afterwards.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse classification of a response's `content-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json` or any `+json` suffix type
    Json,
    /// `text/*`, or no content type at all
    Text,
    /// Anything else; only inspected if it happens to be valid UTF-8
    Binary,
}

impl ContentKind {
    /// Sniff the kind from a raw `content-type` value
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return ContentKind::Text;
        };

        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            ContentKind::Json
        } else if essence.starts_with("text/") || essence.is_empty() {
            ContentKind::Text
        } else {
            ContentKind::Binary
        }
    }

    /// Sniff the kind from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_content_type(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()))
    }
}

/// A response whose body has been read into memory
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Vec<u8>,
}

impl ResponseSnapshot {
    /// Create a snapshot from already-read parts
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Read a live response to completion.
    ///
    /// For non-success responses an unreadable body is replaced by an empty
    /// one, since the status alone is enough to report the failure.
    pub async fn read(response: reqwest::Response) -> crate::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) if !status.is_success() => {
                tracing::debug!("Discarding unreadable error body ({}): {}", status, e);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::new(status, headers, body))
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Content kind of this response
    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_headers(&self.headers)
    }

    /// Whether the response is known to carry no body: status 204, or a
    /// `content-length` header that is exactly `0`.
    pub fn has_no_body(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
            || self
                .headers
                .get(CONTENT_LENGTH)
                .is_some_and(|v| v.as_bytes() == b"0")
    }

    /// Convert a successful response into an [`Envelope`]
    pub fn into_envelope(self) -> crate::Result<Envelope> {
        let status = self.status.as_u16();

        if self.has_no_body() || self.body.is_empty() {
            return Ok(Envelope { data: None, status });
        }

        let data: Value = serde_json::from_slice(&self.body)?;
        Ok(Envelope {
            data: Some(data),
            status,
        })
    }

    /// Convert a failed response into an API error with a best-effort body
    pub fn into_error(self) -> crate::Error {
        crate::Error::api(self.status.as_u16(), &self.body)
    }
}

/// Result of a successful API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Parsed JSON body, `None` when the response carried no body
    pub data: Option<Value>,
    /// Numeric HTTP status
    pub status: u16,
}

impl Envelope {
    /// Deserialize `data` into a concrete type.
    ///
    /// A missing body deserializes from JSON `null`, so `Option<T>` and `()`
    /// targets accept it.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        let value = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// Consume the envelope and return the parsed body
    pub fn into_data(self) -> Option<Value> {
        self.data
    }
}
