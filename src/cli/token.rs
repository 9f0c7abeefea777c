//! `token` subcommand

use super::{GlobalArgs, logging::init_logging};
use crate::CsrfClient;
use anyhow::{Context, Result};
use tracing::info;

/// Arguments for the `token` subcommand
#[derive(Debug)]
pub struct TokenArgs {
    pub refresh: bool,
    pub global: GlobalArgs,
}

/// Print the current token, fetching one if needed or requested
pub async fn run_token_mode(args: TokenArgs) -> Result<()> {
    let settings = args.global.load_settings()?;
    init_logging(&settings.logging, args.global.verbose);

    let client = CsrfClient::builder()
        .settings(settings)
        .cookie_store(args.global.cookie_store())
        .build()
        .context("Failed to build client")?;

    match client.token_cache().ensure(args.refresh).await {
        Some(token) => {
            info!("Token available");
            println!("{}", token);
            Ok(())
        }
        None => {
            eprintln!(
                "No token issued by {}",
                client.token_cache().coordinator().endpoint()
            );
            std::process::exit(1);
        }
    }
}
