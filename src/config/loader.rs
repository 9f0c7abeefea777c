//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CSRF_CLIENT_CONFIG";

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from `CSRF_CLIENT_CONFIG` or the default location
    ///
    /// Priority:
    /// 1. `CSRF_CLIENT_CONFIG` environment variable
    /// 2. ~/.config/csrf-session-client/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<std::path::PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = std::path::PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from {}: {:?}", CONFIG_ENV_VAR, path);
                return Some(path);
            } else {
                warn!("{} points to non-existent file: {:?}", CONFIG_ENV_VAR, path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("csrf-session-client").join("config.toml");
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (applied by the caller afterwards)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_TEST_MUTEX;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new();
        let defaults = loader.defaults();
        assert_eq!(defaults.csrf.cookie_name, "csrftoken");
        assert_eq!(defaults.csrf.header_name, "x-csrftoken");
    }

    #[test]
    fn test_load_from_file() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[api]
base_url = "https://files.example.com"

[csrf]
refresh_path = "/api/v2/session"
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.api.base_url, "https://files.example.com");
        assert_eq!(settings.csrf.refresh_path, "/api/v2/session");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/definitely/not/here/config.toml")))
            .unwrap();

        assert_eq!(settings.csrf.cookie_name, "csrftoken");
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[csrf]
cookie_name = "from_file"
        "#
        )
        .unwrap();

        unsafe {
            std::env::set_var("CSRF_COOKIE_NAME", "from_env");
        }

        let loader = ConfigLoader::new();
        let result = loader.load(Some(temp_file.path()));

        unsafe {
            std::env::remove_var("CSRF_COOKIE_NAME");
        }

        assert_eq!(result.unwrap().csrf.cookie_name, "from_env");
    }

    #[test]
    fn test_invalid_file_contents_fail_validation() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[logging]
level = "shouty"
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        assert!(loader.load(Some(temp_file.path())).is_err());
    }
}
