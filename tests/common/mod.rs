//! Common test utilities and helpers
//!
//! Shared wiremock setup for the integration tests.

#![allow(dead_code)]

use csrf_session_client::{CsrfClient, DocumentCookies, Settings};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/api/v1/auth/options";
pub const TOKEN_HEADER: &str = "x-csrftoken";
pub const VERIFICATION_FAILURE: &str = r#"{"detail": "CSRF Token Verification Failed."}"#;

/// Settings pointing at the mock server with short timeouts
pub fn test_settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = server.uri();
    settings.network.timeout = Duration::from_secs(5);
    settings.network.connect_timeout = Duration::from_secs(2);
    settings
}

/// Client talking to `server` with the given cookie jar contents
pub fn client_with_cookies(server: &MockServer, cookie_string: &str) -> CsrfClient {
    CsrfClient::builder()
        .settings(test_settings(server))
        .cookie_store(Arc::new(DocumentCookies::from_cookie_string(cookie_string)))
        .build()
        .expect("client builds")
}

/// Mount the refresh endpoint, issuing `token` through Set-Cookie
pub async fn mount_refresh(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("csrftoken={}; Path=/", token).as_str())
                .set_delay(Duration::from_millis(50)),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// A 403 carrying the verification failure marker
pub fn verification_failure() -> ResponseTemplate {
    ResponseTemplate::new(403)
        .insert_header("content-type", "application/json")
        .set_body_string(VERIFICATION_FAILURE)
}

/// A JSON response with the given status and body
pub fn json_response(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}
