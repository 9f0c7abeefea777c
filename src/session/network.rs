//! HTTP client construction
//!
//! Every request the crate issues, including token refreshes, goes through one
//! `reqwest::Client` whose cookie jar is the shared [`CookieStore`]. That is
//! what "credentials included" means outside a browser.

use crate::{
    Result,
    config::settings::NetworkSettings,
    cookie::{CookieStore, SessionJar},
};
use reqwest::Client;
use std::sync::Arc;

/// Build the HTTP client used for API calls and token refreshes
pub fn build_http_client(
    network: &NetworkSettings,
    cookies: Arc<dyn CookieStore>,
) -> Result<Client> {
    let client = Client::builder()
        .user_agent(network.user_agent.as_str())
        .timeout(network.timeout)
        .connect_timeout(network.connect_timeout)
        .cookie_provider(Arc::new(SessionJar::new(cookies)))
        .build()
        .map_err(|e| {
            crate::Error::config("network", format!("Failed to create HTTP client: {}", e))
        })?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::{DetachedCookies, DocumentCookies};

    #[tokio::test]
    async fn test_client_creation() {
        let client = build_http_client(
            &NetworkSettings::default(),
            Arc::new(DocumentCookies::new()),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_client_creation_without_cookie_store() {
        let client = build_http_client(&NetworkSettings::default(), Arc::new(DetachedCookies));
        assert!(client.is_ok());
    }
}
