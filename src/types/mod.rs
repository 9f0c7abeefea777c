//! Type definitions for the client
//!
//! This module contains the request descriptors and response envelopes that
//! flow through [`crate::session::CsrfClient`].

pub mod request;
pub mod response;

pub use request::{RequestBody, RequestDescriptor, SAFE_METHODS, is_safe_method};
pub use response::{ContentKind, Envelope, ResponseSnapshot};
