//! Cookie string encoding and parsing
//!
//! Cookie names and values are stored percent-encoded, the way a browser
//! document exposes them. Reading decodes, writing encodes.

use cookie::Cookie;
use cookie::time::{Duration, OffsetDateTime};
use tracing::debug;

/// Percent-encode a cookie pair, returning the wire `(name, value)`.
pub fn encode_pair(name: &str, value: &str) -> (String, String) {
    let encoded = Cookie::new(name, value).encoded().to_string();
    match encoded.split_once('=') {
        Some((name, value)) => (name.to_string(), value.to_string()),
        None => (encoded, String::new()),
    }
}

/// Find the first cookie called `name` in a `;`-joined cookie string.
///
/// Every pair is decoded before comparing, so `name` is the plain name and
/// the value comes back decoded. Pairs that fail to decode are skipped.
pub fn find_cookie(cookie_string: &str, name: &str) -> Option<String> {
    if cookie_string.trim().is_empty() {
        return None;
    }

    for cookie in Cookie::split_parse_encoded(cookie_string) {
        let cookie = match cookie {
            Ok(cookie) => cookie,
            Err(error) => {
                debug!(?error, "failed to decode cookie");
                continue;
            }
        };

        if cookie.name() == name {
            return Some(cookie.value().to_string());
        }
    }

    None
}

/// A single cookie as received in a `Set-Cookie` response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name, as sent on the wire
    pub name: String,
    /// Cookie value, as sent on the wire
    pub value: String,
    /// Whether the attributes ask the client to drop the cookie
    pub expired: bool,
}

/// Parse a `Set-Cookie` header value.
///
/// Only the name, value, and expiry attributes matter here. `Max-Age` takes
/// precedence over `Expires`, matching RFC 6265.
pub fn parse_set_cookie(header: &str) -> Option<SetCookie> {
    let cookie = Cookie::parse(header).ok()?;

    let expired = match cookie.max_age() {
        Some(age) => age <= Duration::ZERO,
        None => cookie
            .expires_datetime()
            .is_some_and(|at| at <= OffsetDateTime::now_utc()),
    };

    Some(SetCookie {
        name: cookie.name().to_string(),
        value: cookie.value_trimmed().to_string(),
        expired,
    })
}
