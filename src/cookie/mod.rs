//! Cookie access
//!
//! Parsing and encoding of cookie strings plus the injectable stores the
//! token cache reads from.

pub mod codec;
pub mod store;

pub use codec::{SetCookie, encode_pair, find_cookie, parse_set_cookie};
pub use store::{CookieStore, DetachedCookies, DocumentCookies, SessionJar};
