//! Token verification failure detection
//!
//! The API reports a rejected anti-forgery token as a plain 403, which is
//! indistinguishable by status from any other permission error. The body has
//! to be inspected for the failure marker.

use crate::types::{ContentKind, ResponseSnapshot};
use reqwest::StatusCode;
use serde_json::Value;

/// Default marker the API embeds in verification failures
pub const DEFAULT_FAILURE_MARKER: &str = "csrf token verification failed";

/// Decides whether a failed response is a token verification failure
#[derive(Debug, Clone)]
pub struct FailureClassifier {
    /// Lowercased marker text
    marker: String,
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_MARKER)
    }
}

impl FailureClassifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into().to_lowercase(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// True only for a 403 whose body carries the marker.
    ///
    /// Anything that cannot be parsed counts as "not a match".
    pub fn is_verification_failure(&self, response: &ResponseSnapshot) -> bool {
        if response.status != StatusCode::FORBIDDEN {
            return false;
        }

        match response.content_kind() {
            ContentKind::Json => match serde_json::from_slice::<Value>(&response.body) {
                Ok(value) => value
                    .get("detail")
                    .and_then(Value::as_str)
                    .is_some_and(|detail| self.contains_marker(detail)),
                Err(_) => false,
            },
            ContentKind::Text => self.contains_marker(&String::from_utf8_lossy(&response.body)),
            ContentKind::Binary => match std::str::from_utf8(&response.body) {
                Ok(text) => self.contains_marker(text),
                Err(_) => false,
            },
        }
    }

    fn contains_marker(&self, text: &str) -> bool {
        text.to_lowercase().contains(self.marker.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

    fn snapshot(status: u16, content_type: Option<&'static str>, body: &[u8]) -> ResponseSnapshot {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        ResponseSnapshot::new(StatusCode::from_u16(status).unwrap(), headers, body)
    }

    #[test]
    fn test_json_detail_with_marker() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("application/json"),
            br#"{"detail": "CSRF Token Verification Failed."}"#,
        );
        assert!(classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_json_detail_without_marker() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("application/json"),
            br#"{"detail": "permission denied"}"#,
        );
        assert!(!classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_marker_outside_detail_is_ignored_for_json() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("application/json"),
            br#"{"message": "CSRF token verification failed"}"#,
        );
        assert!(!classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_non_string_detail() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("application/json"),
            br#"{"detail": ["CSRF token verification failed"]}"#,
        );
        assert!(!classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_other_statuses_never_match() {
        let classifier = FailureClassifier::default();
        for status in [400, 401, 404, 419, 500] {
            let response = snapshot(
                status,
                Some("application/json"),
                br#"{"detail": "CSRF token verification failed"}"#,
            );
            assert!(
                !classifier.is_verification_failure(&response),
                "status {} must not be classified",
                status
            );
        }
    }

    #[test]
    fn test_text_body() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("text/html; charset=utf-8"),
            b"<h1>Forbidden</h1><p>CSRF token verification failed.</p>",
        );
        assert!(classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_missing_content_type_is_text() {
        let classifier = FailureClassifier::default();
        let response = snapshot(403, None, b"csrf token verification failed");
        assert!(classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_malformed_json_fails_closed() {
        let classifier = FailureClassifier::default();
        let response = snapshot(
            403,
            Some("application/json"),
            b"CSRF token verification failed {",
        );
        assert!(!classifier.is_verification_failure(&response));
    }

    #[test]
    fn test_binary_body() {
        let classifier = FailureClassifier::default();

        let readable = snapshot(
            403,
            Some("application/octet-stream"),
            b"CSRF token verification failed",
        );
        assert!(classifier.is_verification_failure(&readable));

        let unreadable = snapshot(
            403,
            Some("application/octet-stream"),
            b"\xff\xfeCSRF token verification failed",
        );
        assert!(!classifier.is_verification_failure(&unreadable));
    }

    #[test]
    fn test_custom_marker_is_case_insensitive() {
        let classifier = FailureClassifier::new("Token Expired");
        assert_eq!(classifier.marker(), "token expired");

        let response = snapshot(403, Some("application/json"), br#"{"detail": "TOKEN EXPIRED"}"#);
        assert!(classifier.is_verification_failure(&response));
    }
}
