//! Single-flight token refresh
//!
//! [`RefreshCoordinator`] guarantees at most one refresh request is in flight
//! per coordinator. Callers arriving while one is pending await the same
//! shared future; once it settles the slot is cleared so the next caller
//! starts a fresh refresh.

use crate::cookie::CookieStore;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use url::Url;

type PendingRefresh = Shared<BoxFuture<'static, Option<String>>>;

#[derive(Default)]
struct InFlight {
    /// Number of refreshes started so far; identifies the pending one
    generation: u64,
    pending: Option<PendingRefresh>,
}

/// Coordinates token refreshes so concurrent callers share one network call
pub struct RefreshCoordinator {
    http: Client,
    endpoint: Url,
    cookies: Arc<dyn CookieStore>,
    cookie_name: Arc<str>,
    slot: Arc<Mutex<InFlight>>,
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("endpoint", &self.endpoint.as_str())
            .field("cookie_name", &self.cookie_name)
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator.
    ///
    /// `http` must use `cookies` as its cookie jar, otherwise the refreshed
    /// token never becomes visible.
    pub fn new(
        http: Client,
        endpoint: Url,
        cookies: Arc<dyn CookieStore>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint,
            cookies,
            cookie_name: Arc::from(cookie_name.into()),
            slot: Arc::new(Mutex::new(InFlight::default())),
        }
    }

    /// Refresh the token, joining an in-flight refresh if there is one.
    ///
    /// Never fails: a network error resolves to whatever the cookie store
    /// reports afterwards, possibly still absent.
    pub async fn refresh(&self) -> Option<String> {
        let pending = {
            let mut slot = self.lock_slot();
            match &slot.pending {
                Some(pending) => {
                    debug!("Joining in-flight token refresh #{}", slot.generation);
                    pending.clone()
                }
                None => {
                    slot.generation += 1;
                    let generation = slot.generation;
                    debug!("Starting token refresh #{}", generation);

                    let pending = run_refresh(
                        self.http.clone(),
                        self.endpoint.clone(),
                        Arc::clone(&self.cookies),
                        Arc::clone(&self.cookie_name),
                        Arc::clone(&self.slot),
                        generation,
                    )
                    .boxed()
                    .shared();

                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Whether a refresh is currently pending
    pub fn is_refreshing(&self) -> bool {
        self.lock_slot().pending.is_some()
    }

    /// Number of refreshes started over this coordinator's lifetime
    pub fn refresh_count(&self) -> u64 {
        self.lock_slot().generation
    }

    /// The refresh endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn lock_slot(&self) -> MutexGuard<'_, InFlight> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_refresh(
    http: Client,
    endpoint: Url,
    cookies: Arc<dyn CookieStore>,
    cookie_name: Arc<str>,
    slot: Arc<Mutex<InFlight>>,
    generation: u64,
) -> Option<String> {
    let outcome = http
        .get(endpoint)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await;

    // The body is irrelevant; the token arrives through the cookie jar.
    match outcome {
        Ok(response) => debug!(
            "Token refresh #{} answered with {}",
            generation,
            response.status()
        ),
        Err(e) => warn!("Token refresh #{} failed: {}", generation, e),
    }

    {
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.pending = None;
        }
    }

    cookies.get(&cookie_name)
}
