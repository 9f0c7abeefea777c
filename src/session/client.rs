//! Request executor
//!
//! [`CsrfClient`] composes headers, attaches the anti-forgery token to unsafe
//! methods and retries a call exactly once when the server rejects the token.
//!
//! ```rust,no_run
//! use csrf_session_client::CsrfClient;
//! use serde_json::json;
//!
//! # async fn example() -> csrf_session_client::Result<()> {
//! let client = CsrfClient::builder()
//!     .base_url("https://api.example.com")
//!     .common_header("accept", "application/json")
//!     .build()?;
//!
//! let created = client.post("/api/v1/videos", &json!({"title": "demo"})).await?;
//! println!("{} -> {:?}", created.status, created.data);
//! # Ok(())
//! # }
//! ```

use super::{
    classifier::FailureClassifier, network::build_http_client, refresh::RefreshCoordinator,
    token_cache::TokenCache,
};
use crate::{
    Error, Result,
    config::Settings,
    cookie::{CookieStore, DocumentCookies},
    types::{Envelope, RequestDescriptor, ResponseSnapshot},
};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use url::Url;

/// HTTP client for an API protected by a cookie-bound anti-forgery token
pub struct CsrfClient {
    http: Client,
    base_url: Url,
    cookies: Arc<dyn CookieStore>,
    token_header: HeaderName,
    common_headers: RwLock<HeaderMap>,
    tokens: TokenCache,
    classifier: FailureClassifier,
}

impl fmt::Debug for CsrfClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfClient")
            .field("base_url", &self.base_url.as_str())
            .field("token_header", &self.token_header)
            .field("tokens", &self.tokens)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl CsrfClient {
    pub fn builder() -> CsrfClientBuilder {
        CsrfClientBuilder::default()
    }

    /// Client with an in-memory cookie store configured from `settings`
    pub fn from_settings(settings: Settings) -> Result<Self> {
        Self::builder().settings(settings).build()
    }

    /// Execute a call and apply the retry policy.
    ///
    /// A 403 classified as a token verification failure forces a token
    /// refresh and re-sends the same descriptor once. Whatever the second
    /// attempt returns is final.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Envelope> {
        let response = self.send(request).await?;
        if response.is_success() {
            return response.into_envelope();
        }

        if !self.classifier.is_verification_failure(&response) {
            debug!(
                "{} {} failed with {}",
                request.method, request.path, response.status
            );
            return Err(response.into_error());
        }

        info!(
            "Token rejected for {} {}, refreshing and retrying once",
            request.method, request.path
        );
        self.tokens.ensure(true).await;

        let retried = self.send(request).await?;
        if retried.is_success() {
            retried.into_envelope()
        } else {
            debug!(
                "Retry of {} {} failed with {}",
                request.method, request.path, retried.status
            );
            Err(retried.into_error())
        }
    }

    pub async fn get(&self, path: &str) -> Result<Envelope> {
        self.execute(&RequestDescriptor::get(path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Envelope> {
        self.execute(&RequestDescriptor::post(path).with_serialized(payload)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Envelope> {
        self.execute(&RequestDescriptor::put(path).with_serialized(payload)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Envelope> {
        self.execute(&RequestDescriptor::patch(path).with_serialized(payload)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Envelope> {
        self.execute(&RequestDescriptor::delete(path)).await
    }

    /// Set a header sent with every subsequent call
    pub fn set_common_header(&self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.common_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
        Ok(())
    }

    /// Stop sending a common header. Returns whether it was set.
    pub fn remove_common_header(&self, name: &str) -> bool {
        self.common_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn common_headers(&self) -> HeaderMap {
        self.common_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn cookies(&self) -> &Arc<dyn CookieStore> {
        &self.cookies
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn classifier(&self) -> &FailureClassifier {
        &self.classifier
    }

    /// Resolve a descriptor path against the base URL.
    ///
    /// Absolute paths (`/api/...`) replace the base URL's path. A path that
    /// resolves to another origin is rejected so the session cookies and the
    /// token never leave the API host.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let url = self.base_url.join(path)?;
        if url.origin() != self.base_url.origin() {
            return Err(Error::validation_with_value(
                "path",
                "Request path must stay on the API origin",
                path,
            ));
        }
        Ok(url)
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseSnapshot> {
        let url = self.resolve(&request.path)?;
        let headers = self.compose_headers(request)?;

        debug!(
            "Sending {} {} (token attached: {})",
            request.method,
            url,
            headers.contains_key(&self.token_header)
        );

        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.to_bytes()?);
        }

        let response = builder.send().await?;
        ResponseSnapshot::read(response).await
    }

    /// Headers for one attempt, lowest precedence first
    fn compose_headers(&self, request: &RequestDescriptor) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(body) = &request.body {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(body.default_content_type()),
            );
        }

        for (name, value) in self
            .common_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            headers.insert(name.clone(), value.clone());
        }

        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        if request.requires_token()
            && let Some(token) = self.tokens.current_token()
        {
            let value = HeaderValue::from_str(&token)
                .map_err(|e| Error::invalid_header(self.token_header.as_str(), e.to_string()))?;
            headers.insert(self.token_header.clone(), value);
        }

        Ok(headers)
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::invalid_header(name, e.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e.to_string()))?;
    Ok((header_name, header_value))
}

/// Builder for [`CsrfClient`]
#[derive(Debug, Default)]
pub struct CsrfClientBuilder {
    settings: Settings,
    base_url: Option<String>,
    cookies: Option<Arc<dyn CookieStore>>,
    common_headers: Vec<(String, String)>,
}

impl CsrfClientBuilder {
    /// Start from these settings instead of the defaults
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the API base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Cookie store holding the session and the token.
    ///
    /// Defaults to an empty [`DocumentCookies`].
    pub fn cookie_store(mut self, cookies: Arc<dyn CookieStore>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Add a client-wide header
    pub fn common_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.common_headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<CsrfClient> {
        let mut settings = self.settings;
        if let Some(base_url) = self.base_url {
            settings.api.base_url = base_url;
        }
        settings.validate()?;

        let base_url = settings.base_url()?;
        let cookies = self
            .cookies
            .unwrap_or_else(|| Arc::new(DocumentCookies::new()));

        let mut common_headers = HeaderMap::new();
        for (name, value) in &self.common_headers {
            let (name, value) = parse_header(name, value)?;
            common_headers.insert(name, value);
        }

        let header_name = settings.csrf.header_name.as_str();
        let token_header = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| Error::invalid_header(header_name, e.to_string()))?;

        let http = build_http_client(&settings.network, Arc::clone(&cookies))?;
        let refresh_endpoint = base_url.join(&settings.csrf.refresh_path)?;
        if refresh_endpoint.origin() != base_url.origin() {
            return Err(Error::validation_with_value(
                "refresh_path",
                "Refresh path must stay on the API origin",
                &settings.csrf.refresh_path,
            ));
        }
        let coordinator = RefreshCoordinator::new(
            http.clone(),
            refresh_endpoint,
            Arc::clone(&cookies),
            settings.csrf.cookie_name.as_str(),
        );
        let tokens = TokenCache::new(
            Arc::clone(&cookies),
            settings.csrf.cookie_name.as_str(),
            coordinator,
        );

        debug!(
            "Built client for {} (cookie: {}, header: {})",
            base_url, settings.csrf.cookie_name, token_header
        );

        Ok(CsrfClient {
            http,
            base_url,
            cookies,
            token_header,
            common_headers: RwLock::new(common_headers),
            tokens,
            classifier: FailureClassifier::new(settings.csrf.failure_marker),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestBody;
    use serde_json::json;

    fn client_with_token(token: Option<&str>) -> CsrfClient {
        let cookies = match token {
            Some(token) => DocumentCookies::from_cookie_string(&format!("csrftoken={}", token)),
            None => DocumentCookies::new(),
        };
        CsrfClient::builder()
            .base_url("http://localhost:8000")
            .cookie_store(Arc::new(cookies))
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_content_type_for_json_body() {
        let client = client_with_token(None);
        let request = RequestDescriptor::post("/x").with_json(json!({}));

        let headers = client.compose_headers(&request).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_header_precedence() {
        let client = client_with_token(Some("tok"));
        client
            .set_common_header("Content-Type", "application/vnd.api+json")
            .unwrap();
        client.set_common_header("x-client", "common").unwrap();

        let request = RequestDescriptor::post("/x")
            .with_json(json!({}))
            .with_header("x-client", "per-call")
            .with_header("x-csrftoken", "forged");

        let headers = client.compose_headers(&request).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/vnd.api+json");
        assert_eq!(headers["x-client"], "per-call");
        assert_eq!(headers["x-csrftoken"], "tok");
    }

    #[test]
    fn test_safe_method_has_no_token_header() {
        let client = client_with_token(Some("tok"));
        let headers = client
            .compose_headers(&RequestDescriptor::get("/x"))
            .unwrap();
        assert!(!headers.contains_key("x-csrftoken"));
    }

    #[test]
    fn test_absent_token_yields_no_header() {
        let client = client_with_token(None);
        let headers = client
            .compose_headers(&RequestDescriptor::delete("/x"))
            .unwrap();
        assert!(!headers.contains_key("x-csrftoken"));
    }

    #[test]
    fn test_text_body_content_type() {
        let client = client_with_token(None);
        let request = RequestDescriptor {
            body: Some(RequestBody::Text("hi".into())),
            ..RequestDescriptor::put("/x")
        };
        let headers = client.compose_headers(&request).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn test_invalid_per_call_header() {
        let client = client_with_token(None);
        let request = RequestDescriptor::get("/x").with_header("bad header", "v");
        assert!(matches!(
            client.compose_headers(&request),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_remove_common_header() {
        let client = client_with_token(None);
        client.set_common_header("x-client", "1").unwrap();
        assert!(client.remove_common_header("x-client"));
        assert!(!client.remove_common_header("x-client"));
        assert!(client.common_headers().is_empty());
    }

    #[test]
    fn test_resolve_rejects_foreign_origin() {
        let client = client_with_token(Some("tok"));
        let err = client.resolve("https://elsewhere.example/steal").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = CsrfClient::builder().base_url("not a url").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_refresh_path_on_other_host() {
        let mut settings = Settings::default();
        settings.api.base_url = "http://localhost:8000".to_string();
        settings.csrf.refresh_path = "//other.host/x".to_string();

        let err = CsrfClient::builder().settings(settings).build().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { ref field, .. } if field == "refresh_path"
        ));
    }

    #[test]
    fn test_refresh_endpoint_resolved_against_base_url() {
        let client = client_with_token(None);
        assert_eq!(
            client.token_cache().coordinator().endpoint().as_str(),
            "http://localhost:8000/api/v1/auth/options"
        );
        assert_eq!(
            client.resolve("/api/v1/videos").unwrap().as_str(),
            "http://localhost:8000/api/v1/videos"
        );
    }
}
