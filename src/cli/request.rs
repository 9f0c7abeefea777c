//! `request` subcommand
//!
//! Executes one API call through [`CsrfClient`] and prints the envelope.

use super::{GlobalArgs, logging::init_logging};
use crate::{
    CsrfClient, Error,
    error::{format_error, format_error_for_logging},
    types::{RequestBody, RequestDescriptor},
};
use anyhow::{Context, Result, bail};
use reqwest::Method;
use tracing::debug;

/// Arguments for the `request` subcommand
#[derive(Debug)]
pub struct RequestArgs {
    pub method: String,
    pub path: String,
    pub data: Option<String>,
    pub headers: Vec<String>,
    pub global: GlobalArgs,
}

/// Run the `request` subcommand
pub async fn run_request_mode(args: RequestArgs) -> Result<()> {
    let settings = args.global.load_settings()?;
    init_logging(&settings.logging, args.global.verbose);

    let request = build_descriptor(&args)?;
    debug!("Executing {} {}", request.method, request.path);

    let client = CsrfClient::builder()
        .settings(settings)
        .cookie_store(args.global.cookie_store())
        .build()
        .context("Failed to build client")?;

    // A fresh process has no token yet; fetch one before an unsafe call.
    if request.requires_token() {
        client.token_cache().ensure(false).await;
    }

    match client.execute(&request).await {
        Ok(envelope) => {
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
        Err(e) => {
            debug!("Request failed: {}", format_error_for_logging(&e));
            eprintln!("Request failed: {}", format_error(&e));
            if let Error::Api { status, body } = &e {
                let output = serde_json::json!({ "status": status, "body": body });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            std::process::exit(1);
        }
    }
}

/// Build the descriptor from CLI arguments.
///
/// `--data` is sent as JSON when it parses as JSON, otherwise as text.
pub fn build_descriptor(args: &RequestArgs) -> Result<RequestDescriptor> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let mut request = RequestDescriptor::new(method, args.path.as_str());

    for header in &args.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Invalid header '{}', expected NAME:VALUE", header);
        };
        request = request.with_header(name.trim(), value.trim());
    }

    if let Some(data) = &args.data {
        request.body = Some(match serde_json::from_str(data) {
            Ok(value) => RequestBody::Json(value),
            Err(_) => RequestBody::Text(data.clone()),
        });
    }

    Ok(request)
}
