//! Anti-forgery token cache
//!
//! The token lives in the cookie store; this type only knows which cookie to
//! read and when to ask the [`RefreshCoordinator`] for a new one.

use super::refresh::RefreshCoordinator;
use crate::cookie::CookieStore;
use std::sync::Arc;

/// Reads the current token and refreshes it on demand
#[derive(Debug)]
pub struct TokenCache {
    cookies: Arc<dyn CookieStore>,
    cookie_name: String,
    coordinator: RefreshCoordinator,
}

impl TokenCache {
    pub fn new(
        cookies: Arc<dyn CookieStore>,
        cookie_name: impl Into<String>,
        coordinator: RefreshCoordinator,
    ) -> Self {
        Self {
            cookies,
            cookie_name: cookie_name.into(),
            coordinator,
        }
    }

    /// Token currently held in the cookie store
    pub fn current_token(&self) -> Option<String> {
        self.cookies.get(&self.cookie_name)
    }

    /// Return a usable token, refreshing when forced or when none is cached.
    ///
    /// A cached token with `force_refresh == false` is returned without any
    /// network access.
    pub async fn ensure(&self, force_refresh: bool) -> Option<String> {
        if !force_refresh
            && let Some(token) = self.current_token()
        {
            return Some(token);
        }

        self.coordinator.refresh().await
    }

    /// Name of the cookie holding the token
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }
}
