//! Configuration example
//!
//! Shows defaults, environment overrides and file-based configuration.

use csrf_session_client::{CsrfClient, Settings, config::ConfigLoader};
use std::env;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("1. Default configuration:");
    let defaults = Settings::default();
    println!("   Base URL:      {}", defaults.api.base_url);
    println!("   Cookie:        {}", defaults.csrf.cookie_name);
    println!("   Header:        {}", defaults.csrf.header_name);
    println!("   Refresh path:  {}", defaults.csrf.refresh_path);
    println!("   Timeout:       {:?}", defaults.network.timeout);

    println!("\n2. Environment overrides:");
    unsafe {
        env::set_var("CSRF_COOKIE_NAME", "XSRF-TOKEN");
        env::set_var("CSRF_HEADER_NAME", "X-XSRF-TOKEN");
    }
    let from_env = ConfigLoader::new().from_env_only()?;
    println!("   Cookie:        {}", from_env.csrf.cookie_name);
    println!("   Header:        {}", from_env.csrf.header_name);
    unsafe {
        env::remove_var("CSRF_COOKIE_NAME");
        env::remove_var("CSRF_HEADER_NAME");
    }

    println!("\n3. Configuration file:");
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[api]
base_url = "https://api.example.com"

[csrf]
refresh_path = "/api/v2/auth/csrf"

[network]
timeout = 10
        "#
    )?;
    let settings = ConfigLoader::new().load(Some(file.path()))?;
    println!("   Base URL:      {}", settings.api.base_url);
    println!("   Timeout:       {:?}", settings.network.timeout);

    let client = CsrfClient::from_settings(settings)?;
    println!(
        "   Refresh URL:   {}",
        client.token_cache().coordinator().endpoint()
    );

    Ok(())
}
