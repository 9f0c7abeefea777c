//! Error formatting utilities
//!
//! Human-readable and structured renderings of [`Error`], used by the CLI when
//! reporting failures.

use crate::Error;
use std::error::Error as StdError;

/// Format error for display, appending each distinct cause in the source chain.
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::Api { status, body } => {
            match body.get("detail").and_then(|d| d.as_str()) {
                Some(detail) => format!("API error {}: {}", status, detail),
                None => format!("API error {}", status),
            }
        }

        Error::Config { field, message } => {
            format!("Configuration error in {}: {}", field, message)
        }

        Error::InvalidHeader { name, message } => {
            format!("Invalid header '{}': {}", name, message)
        }

        Error::Validation {
            field,
            message,
            value,
        } => match value {
            Some(val) => format!(
                "Validation failed for {} (value: '{}'): {}",
                field, val, message
            ),
            None => format!("Validation failed for {}: {}", field, message),
        },

        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "retryable": error.is_retryable(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if let Error::Api { status, body } = error {
        log_data["status"] = serde_json::Value::Number((*status).into());
        log_data["body"] = body.clone();
    }

    log_data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_formatting_uses_detail() {
        let error = Error::api(403, br#"{"detail": "permission denied"}"#);
        assert_eq!(format_error(&error), "API error 403: permission denied");
    }

    #[test]
    fn test_api_error_formatting_without_detail() {
        let error = Error::api(502, b"bad gateway");
        assert_eq!(format_error(&error), "API error 502");
    }

    #[test]
    fn test_nested_error_formatting() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let wrapped_error = Error::Io(io_error);

        let formatted = format_error(&wrapped_error);
        assert!(formatted.contains("File not found"));
    }

    #[test]
    fn test_config_error_formatting() {
        let error = Error::config("base_url", "Invalid URL format");
        let formatted = format_error(&error);

        assert!(formatted.contains("Configuration error in base_url"));
        assert!(formatted.contains("Invalid URL format"));
    }

    #[test]
    fn test_logging_error_formatting() {
        let error = Error::api(409, br#"{"detail": "conflict", "code": 7}"#);
        let log_data = format_error_for_logging(&error);

        assert_eq!(log_data["category"], "api");
        assert_eq!(log_data["status"], 409);
        assert_eq!(log_data["body"], json!({"detail": "conflict", "code": 7}));
        assert_eq!(log_data["retryable"], false);
        assert!(log_data["timestamp"].is_string());
    }
}
