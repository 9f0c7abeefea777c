//! Basic usage example
//!
//! Calls a session-authenticated API, letting the client fetch and attach the
//! anti-forgery token. Point `CSRF_API_BASE_URL` at a running API first.

use csrf_session_client::{CsrfClient, DocumentCookies, Settings, error::format_error};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let settings = Settings::from_env()?;

    // Reuse a session cookie obtained from a prior login
    let session = std::env::var("SESSION_COOKIE").unwrap_or_default();
    let cookies = Arc::new(DocumentCookies::from_cookie_string(&session));

    let client = CsrfClient::builder()
        .settings(settings)
        .cookie_store(cookies)
        .common_header("accept", "application/json")
        .build()?;

    // Safe methods never carry the token
    match client.get("/api/v1/videos").await {
        Ok(envelope) => println!("GET  -> {} {:?}", envelope.status, envelope.data),
        Err(e) => eprintln!("GET failed: {}", format_error(&e)),
    }

    // Unsafe methods carry it; a rejected token is refreshed and retried once
    let token = client.token_cache().ensure(false).await;
    println!("Token held: {}", token.is_some());

    match client
        .post("/api/v1/videos", &json!({"title": "Example"}))
        .await
    {
        Ok(envelope) => println!("POST -> {} {:?}", envelope.status, envelope.data),
        Err(e) => {
            eprintln!("POST failed: {}", format_error(&e));
            std::process::exit(1);
        }
    }

    Ok(())
}
