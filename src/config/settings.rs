//! Configuration settings
//!
//! Settings load from a TOML file, environment variables, and command-line
//! overrides. Every field carries a serde default so partial files are valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Helper functions for serde defaults
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_cookie_name() -> String {
    "csrftoken".to_string()
}

fn default_header_name() -> String {
    "x-csrftoken".to_string()
}

fn default_refresh_path() -> String {
    "/api/v1/auth/options".to_string()
}

fn default_failure_marker() -> String {
    "csrf token verification failed".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    crate::utils::version::user_agent()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// Duration serialization module
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Main configuration settings for the client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// API endpoint configuration
    #[serde(default)]
    pub api: ApiSettings,
    /// Anti-forgery token configuration
    #[serde(default)]
    pub csrf: CsrfSettings,
    /// Network configuration
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Origin every request path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Anti-forgery token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfSettings {
    /// Cookie holding the token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Request header the token is sent in
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// Endpoint whose response re-issues the token cookie
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Lowercase phrase identifying a token-verification rejection
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Whole-request timeout in seconds
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
    /// Connection timeout in seconds
    #[serde(with = "duration_secs", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            header_name: default_header_name(),
            refresh_path: default_refresh_path(),
            failure_marker: default_failure_marker(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();
        settings.apply_env()?;
        Ok(settings)
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge settings with environment variable overrides
    ///
    /// Every variable that is set wins over the file, even when it spells
    /// out the built-in default.
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> crate::Result<()> {
        if let Ok(base_url) = std::env::var("CSRF_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(cookie_name) = std::env::var("CSRF_COOKIE_NAME") {
            self.csrf.cookie_name = cookie_name;
        }

        if let Ok(header_name) = std::env::var("CSRF_HEADER_NAME") {
            self.csrf.header_name = header_name;
        }

        if let Ok(refresh_path) = std::env::var("CSRF_REFRESH_PATH") {
            self.csrf.refresh_path = refresh_path;
        }

        if let Ok(timeout) = std::env::var("CSRF_HTTP_TIMEOUT") {
            let timeout_secs: u64 = timeout.parse().map_err(|e| {
                crate::Error::config("timeout", &format!("Invalid timeout: {}", e))
            })?;
            self.network.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Parsed API origin
    pub fn base_url(&self) -> crate::Result<url::Url> {
        Ok(url::Url::parse(&self.api.base_url)?)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(crate::Error::config(
                "base_url",
                &format!("Invalid base URL '{}': {}", self.api.base_url, e),
            ));
        }

        if self.csrf.cookie_name.trim().is_empty() {
            return Err(crate::Error::config(
                "cookie_name",
                "Cookie name cannot be empty",
            ));
        }

        if reqwest::header::HeaderName::from_bytes(self.csrf.header_name.as_bytes()).is_err() {
            return Err(crate::Error::config(
                "header_name",
                &format!("Invalid header name: {}", self.csrf.header_name),
            ));
        }

        if !self.csrf.refresh_path.starts_with('/') {
            return Err(crate::Error::config(
                "refresh_path",
                &format!("Refresh path must be absolute: {}", self.csrf.refresh_path),
            ));
        }

        if self.csrf.failure_marker.is_empty() {
            return Err(crate::Error::config(
                "failure_marker",
                "Failure marker cannot be empty",
            ));
        }

        if self.network.timeout.is_zero() {
            return Err(crate::Error::config("timeout", "Timeout cannot be 0"));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(crate::Error::config(
                    "log_format",
                    &format!("Invalid log format: {}", other),
                ));
            }
        }

        Ok(())
    }
}
