//! Injectable cookie stores
//!
//! The token lives in a cookie the server sets. [`CookieStore`] abstracts where
//! that cookie is kept so the token cache and refresh logic can run against an
//! in-memory store in tests and against the HTTP client's jar in production.

use super::codec::{SetCookie, encode_pair, find_cookie, parse_set_cookie};
use reqwest::header::HeaderValue;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Read/write access to the ambient cookie state
pub trait CookieStore: Send + Sync + fmt::Debug {
    /// The ambient cookie string: `name=value` pairs joined by `; `.
    ///
    /// Returns `None` when no cookie store exists at all.
    fn cookie_string(&self) -> Option<String>;

    /// Store `value` under `name`, both percent-encoded.
    fn set(&self, name: &str, value: &str);

    /// Drop the cookie called `name`.
    fn remove(&self, name: &str);

    /// Apply a cookie received from the server, kept in wire form.
    fn store_set_cookie(&self, cookie: SetCookie);

    /// Decoded value of the first cookie called `name`.
    fn get(&self, name: &str) -> Option<String> {
        self.cookie_string().and_then(|raw| find_cookie(&raw, name))
    }
}

/// In-memory cookie store behaving like a browser document's cookie string
///
/// All cookies belong to the single API origin the client talks to, so
/// domain and path attributes are not tracked.
#[derive(Debug, Default)]
pub struct DocumentCookies {
    /// Encoded `(name, value)` pairs in insertion order
    entries: Mutex<Vec<(String, String)>>,
}

impl DocumentCookies {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a cookie string such as `a=1; b=2`
    pub fn from_cookie_string(raw: &str) -> Self {
        let entries = raw
            .split(';')
            .map(str::trim)
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Number of cookies currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no cookies
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert(&self, key: String, value: String) {
        let mut entries = self.lock();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    fn drop_key(&self, key: &str) {
        self.lock().retain(|(k, _)| k != key);
    }
}

impl CookieStore for DocumentCookies {
    fn cookie_string(&self) -> Option<String> {
        let entries = self.lock();
        Some(
            entries
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn set(&self, name: &str, value: &str) {
        let (key, value) = encode_pair(name, value);
        self.upsert(key, value);
    }

    fn remove(&self, name: &str) {
        let (key, _) = encode_pair(name, "");
        self.drop_key(&key);
    }

    fn store_set_cookie(&self, cookie: SetCookie) {
        if cookie.expired {
            debug!("Server expired cookie {}", cookie.name);
            self.drop_key(&cookie.name);
        } else {
            self.upsert(cookie.name, cookie.value);
        }
    }
}

/// Stand-in for an execution context with no cookie store
///
/// Every read reports absent and every write is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedCookies;

impl CookieStore for DetachedCookies {
    fn cookie_string(&self) -> Option<String> {
        None
    }

    fn set(&self, _name: &str, _value: &str) {}

    fn remove(&self, _name: &str) {}

    fn store_set_cookie(&self, _cookie: SetCookie) {}
}

/// Adapter installing a [`CookieStore`] as the HTTP client's cookie jar
///
/// Cookies set by any response, including the refresh endpoint, land in the
/// store, and every outgoing request carries the store's cookies.
#[derive(Debug, Clone)]
pub struct SessionJar {
    store: Arc<dyn CookieStore>,
}

impl SessionJar {
    /// Wrap a shared store
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        Self { store }
    }
}

impl reqwest::cookie::CookieStore for SessionJar {
    fn set_cookies(
        &self,
        cookie_headers: &mut dyn Iterator<Item = &HeaderValue>,
        _url: &url::Url,
    ) {
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            if let Some(cookie) = parse_set_cookie(raw) {
                self.store.store_set_cookie(cookie);
            }
        }
    }

    fn cookies(&self, _url: &url::Url) -> Option<HeaderValue> {
        let raw = self.store.cookie_string()?;

        let mut sendable = Vec::new();
        for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
            if HeaderValue::from_str(pair).is_ok() {
                sendable.push(pair);
            } else {
                let name = pair.split_once('=').map_or(pair, |(name, _)| name);
                debug!("Skipping cookie {} with invalid header characters", name);
            }
        }

        if sendable.is_empty() {
            return None;
        }
        HeaderValue::from_str(&sendable.join("; ")).ok()
    }
}
