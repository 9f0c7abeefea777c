//! Token-aware request layer
//!
//! Leaves first: the [`TokenCache`] reads the token from the cookie store,
//! the [`RefreshCoordinator`] fetches a new one with at most one request in
//! flight, the [`FailureClassifier`] recognises rejected tokens and the
//! [`CsrfClient`] ties them together with a single retry.

pub mod classifier;
pub mod client;
pub mod network;
pub mod refresh;
pub mod token_cache;

pub use classifier::{DEFAULT_FAILURE_MARKER, FailureClassifier};
pub use client::{CsrfClient, CsrfClientBuilder};
pub use network::build_http_client;
pub use refresh::RefreshCoordinator;
pub use token_cache::TokenCache;
