//! csrf-session-client
//!
//! An HTTP client for APIs that authenticate with a session cookie and guard
//! unsafe methods with an anti-forgery token. The token is read from a cookie,
//! sent back in a request header, refreshed on demand with at most one
//! refresh request in flight, and a call rejected for a stale token is retried
//! exactly once.
//!
//! # Architecture
//!
//! - [`cookie`]: cookie string codec and the injectable [`CookieStore`]
//! - [`session`]: token cache, refresh coordinator, failure classifier and
//!   the [`CsrfClient`] request executor
//! - [`types`]: request descriptors and response envelopes
//! - [`config`]: TOML + environment configuration
//! - [`cli`]: the `csrf-client` binary's subcommands
//!
//! # Examples
//!
//! ```rust,no_run
//! use csrf_session_client::{CsrfClient, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = CsrfClient::from_settings(Settings::default())?;
//! let videos = client.get("/api/v1/videos").await?;
//! println!("{:?}", videos.data);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod cookie;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use crate::cookie::{CookieStore, DetachedCookies, DocumentCookies};
pub use error::{Error, Result};
pub use session::{
    CsrfClient, CsrfClientBuilder, FailureClassifier, RefreshCoordinator, TokenCache,
};
pub use types::{ContentKind, Envelope, RequestBody, RequestDescriptor};
