//! Command-line client for anti-forgery token protected APIs
//!
//! # Usage
//!
//! ## Execute a request
//! ```bash
//! csrf-client --base-url http://localhost:8000 --cookie sessionid=abc \
//!     request POST /api/v1/videos --data '{"title": "demo"}'
//! ```
//!
//! ## Print the current token
//! ```bash
//! csrf-client token --refresh
//! ```

use clap::{Parser, Subcommand};

use csrf_session_client::cli::{
    GlobalArgs,
    request::{RequestArgs, run_request_mode},
    token::{TokenArgs, run_token_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "csrf-client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// API base URL (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Seed a cookie, e.g. a session id (repeatable)
    #[arg(long = "cookie", global = true, value_name = "NAME=VALUE")]
    cookies: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute an API request and print the response envelope
    Request {
        /// HTTP method
        method: String,

        /// Request path, resolved against the base URL
        path: String,

        /// Request body; sent as JSON when it parses as JSON
        #[arg(short, long)]
        data: Option<String>,

        /// Extra header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
        headers: Vec<String>,
    },
    /// Print the anti-forgery token, fetching one if none is held
    Token {
        /// Force a refresh even when a token is held
        #[arg(short, long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let global = GlobalArgs {
        config: cli.config,
        base_url: cli.base_url,
        cookies: cli.cookies,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Request {
            method,
            path,
            data,
            headers,
        } => {
            run_request_mode(RequestArgs {
                method,
                path,
                data,
                headers,
                global,
            })
            .await
        }
        Commands::Token { refresh } => run_token_mode(TokenArgs { refresh, global }).await,
    }
}
