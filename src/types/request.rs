//! Request type definitions
//!
//! A [`RequestDescriptor`] describes one logical API call. The client borrows
//! it immutably, so a retry re-sends exactly what the first attempt sent apart
//! from the token header.

use reqwest::Method;
use serde::Serialize;

/// Methods exempt from carrying the anti-forgery token
pub const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// Whether `method` is in the safe set.
///
/// The comparison is exact and case-sensitive on the method as transmitted,
/// so an extension method spelled `get` is not safe.
pub fn is_safe_method(method: &Method) -> bool {
    SAFE_METHODS.contains(&method.as_str())
}

/// Body attached to a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document; defaults the content type to `application/json`
    Json(serde_json::Value),
    /// Plain text; defaults the content type to `text/plain; charset=utf-8`
    Text(String),
}

impl RequestBody {
    /// Content type applied unless a common or per-call header overrides it
    pub fn default_content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain; charset=utf-8",
        }
    }

    /// Serialized body bytes
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        match self {
            RequestBody::Json(value) => Ok(serde_json::to_vec(value)?),
            RequestBody::Text(text) => Ok(text.as_bytes().to_vec()),
        }
    }
}

/// Description of a single API call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Target path, resolved against the client's base URL
    pub path: String,
    /// Per-call headers, highest precedence
    pub headers: Vec<(String, String)>,
    /// Optional body
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    /// Create a descriptor with no headers and no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST descriptor
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PUT descriptor
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Shorthand for a PATCH descriptor
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Shorthand for a DELETE descriptor
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a per-call header. Later headers win over earlier ones.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Serialize `payload` and attach it as a JSON body
    pub fn with_serialized<T: Serialize + ?Sized>(self, payload: &T) -> crate::Result<Self> {
        Ok(self.with_json(serde_json::to_value(payload)?))
    }

    /// Attach a plain-text body
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }

    /// Whether this call must carry the anti-forgery token
    pub fn requires_token(&self) -> bool {
        !is_safe_method(&self.method)
    }
}
