//! Command-line front end
//!
//! Each subcommand of the `csrf-client` binary lives in its own module and
//! shares configuration loading and logging setup from here.

pub mod logging;
pub mod request;
pub mod token;

use crate::{
    Settings,
    config::ConfigLoader,
    cookie::{CookieStore, DocumentCookies, parse_set_cookie},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub cookies: Vec<String>,
    pub verbose: bool,
}

impl GlobalArgs {
    /// Resolve settings with precedence CLI > env > file > defaults
    pub fn load_settings(&self) -> Result<Settings> {
        let config_path = match &self.config {
            Some(config) => Some(PathBuf::from(config)),
            None => ConfigLoader::get_config_path(),
        };

        let mut settings = ConfigLoader::new()
            .load(config_path.as_deref())
            .context("Failed to load configuration")?;

        if let Some(base_url) = &self.base_url {
            settings.api.base_url = base_url.clone();
        }
        if self.verbose {
            settings.logging.level = "debug".to_string();
        }

        settings.validate().context("Invalid configuration")?;
        Ok(settings)
    }

    /// Cookie store seeded from `--cookie name=value` arguments
    ///
    /// Arguments are taken as already encoded, the way a browser would send
    /// them, and stored without further escaping.
    pub fn cookie_store(&self) -> Arc<dyn CookieStore> {
        let store = DocumentCookies::new();
        for pair in &self.cookies {
            match parse_set_cookie(pair) {
                Some(mut cookie) => {
                    cookie.expired = false;
                    store.store_set_cookie(cookie);
                }
                None => warn!("Ignoring malformed --cookie argument '{}'", pair),
            }
        }
        Arc::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_store_from_args() {
        let args = GlobalArgs {
            cookies: vec!["sessionid=abc".to_string(), "csrftoken = t1".to_string()],
            ..Default::default()
        };

        let store = args.cookie_store();
        assert_eq!(store.get("sessionid"), Some("abc".to_string()));
        assert_eq!(store.get("csrftoken"), Some("t1".to_string()));
    }

    #[test]
    fn test_cookie_args_are_kept_in_wire_form() {
        let args = GlobalArgs {
            cookies: vec!["sessionid=v1:sig%2Fx".to_string(), "garbage".to_string()],
            ..Default::default()
        };

        let store = args.cookie_store();
        assert_eq!(
            store.cookie_string(),
            Some("sessionid=v1:sig%2Fx".to_string())
        );
        assert_eq!(store.get("sessionid"), Some("v1:sig/x".to_string()));
    }

    #[test]
    fn test_base_url_override() {
        let _lock = crate::config::ENV_TEST_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://file.example\"\n").unwrap();

        let args = GlobalArgs {
            config: Some(path.to_string_lossy().into_owned()),
            base_url: Some("http://cli.example".to_string()),
            verbose: true,
            ..Default::default()
        };

        let settings = args.load_settings().unwrap();
        assert_eq!(settings.api.base_url, "http://cli.example");
        assert_eq!(settings.logging.level, "debug");
    }
}
