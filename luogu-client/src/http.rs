//! HTTP gateways for the content API.
//!
//! [`LuoguClient`] owns one `reqwest::Client` (and, for sessions, its cookie
//! jar) and issues the three kinds of request every entity needs:
//!
//! - `fetch`: content-only GET, decoded as JSON and checked against the
//!   application `code` taxonomy
//! - `fetch_html`: plain GET of a full HTML page (CSRF source)
//! - `mutate`: POST guarded by a freshly resolved CSRF token
//!
//! Handles are cheap to clone; clones share one transport.

use crate::config::ClientConfig;
use crate::csrf::resolve_csrf_token;
use crate::error::{LuoguError, LuoguResult};
use luogu_types::RawPayload;
use reqwest::cookie::Jar;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

/// Header asking the server for the JSON payload instead of a rendered page.
pub const CONTENT_ONLY_HEADER: &str = "x-luogu-type";

/// Header carrying the anti-forgery token on mutations.
pub const CSRF_HEADER: &str = "x-csrf-token";

static SHARED: OnceLock<LuoguClient> = OnceLock::new();

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    jar: Option<Arc<Jar>>,
}

/// A handle on one HTTP transport plus its configuration.
#[derive(Clone)]
pub struct LuoguClient {
    inner: Arc<ClientInner>,
    timeout: Option<Duration>,
}

impl LuoguClient {
    /// Creates an anonymous client without a cookie store.
    pub fn new(config: ClientConfig) -> LuoguResult<Self> {
        Self::build(config, None)
    }

    /// Creates a client whose requests read and write `jar`.
    pub fn with_cookie_jar(config: ClientConfig, jar: Arc<Jar>) -> LuoguResult<Self> {
        Self::build(config, Some(jar))
    }

    fn build(config: ClientConfig, jar: Option<Arc<Jar>>) -> LuoguResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(jar) = &jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { http, config, jar }),
            timeout: None,
        })
    }

    /// The process-wide anonymous client, built on first use.
    ///
    /// Fails only if the TLS backend cannot be initialised. A failed build is
    /// not cached; the next call tries again.
    pub fn try_shared() -> LuoguResult<&'static LuoguClient> {
        if let Some(client) = SHARED.get() {
            return Ok(client);
        }
        let client = Self::new(ClientConfig::default())?;
        debug!("Built shared client for {}", client.config().base_url);
        Ok(SHARED.get_or_init(|| client))
    }

    /// Like [`try_shared`](Self::try_shared), for the `get` shortcuts.
    ///
    /// # Panics
    ///
    /// Panics if the shared client cannot be built.
    pub fn shared() -> &'static LuoguClient {
        match Self::try_shared() {
            Ok(client) => client,
            Err(e) => panic!("cannot build the shared HTTP client: {e}"),
        }
    }

    /// Returns a handle on the same transport whose requests use `timeout`
    /// as their deadline.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: Some(timeout),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The cookie jar backing this client, if it has one.
    pub fn cookie_jar(&self) -> Option<&Arc<Jar>> {
        self.inner.jar.as_ref()
    }

    /// Returns true if both handles drive the same underlying transport.
    pub fn same_transport(&self, other: &LuoguClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let config = &self.inner.config;
        let mut builder = self
            .inner
            .http
            .request(method, config.url(path))
            .header(USER_AGENT, &config.user_agent)
            .timeout(self.timeout.unwrap_or_else(|| config.request_timeout()));
        if let Some(referer) = &config.referer {
            builder = builder.header(REFERER, referer);
        }
        builder
    }

    /// Sends a content-only GET and returns the decoded body.
    ///
    /// Raises a taxonomy error when the body's `code` is 400 or above; the
    /// message is taken from `currentData.errorMessage`.
    pub async fn fetch<Q>(&self, path: &str, query: &Q) -> LuoguResult<RawPayload>
    where
        Q: Serialize + ?Sized,
    {
        let body = self.get_json(path, query).await?;
        check_code(&body)?;
        Ok(body)
    }

    /// Like [`fetch`](Self::fetch), but for API endpoints whose responses
    /// carry no `code` field.
    pub async fn fetch_unchecked<Q>(&self, path: &str, query: &Q) -> LuoguResult<RawPayload>
    where
        Q: Serialize + ?Sized,
    {
        self.get_json(path, query).await
    }

    async fn get_json<Q>(&self, path: &str, query: &Q) -> LuoguResult<RawPayload>
    where
        Q: Serialize + ?Sized,
    {
        debug!("Fetching {}", path);
        let response = self
            .request(Method::GET, path)
            .query(query)
            .header(CONTENT_ONLY_HEADER, "content-only")
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        into_object(serde_json::from_str(&text)?)
    }

    /// Fetches a full HTML page.
    pub async fn fetch_html(&self, path: &str) -> LuoguResult<String> {
        debug!("Fetching page {}", path);
        let response = self
            .request(Method::GET, path)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches raw bytes (e.g. the captcha image).
    pub async fn fetch_bytes(&self, path: &str) -> LuoguResult<Vec<u8>> {
        debug!("Fetching bytes {}", path);
        let response = self
            .request(Method::GET, path)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// POSTs `body` as JSON with a CSRF token resolved from the configured
    /// CSRF page.
    ///
    /// The response's application `code` is not inspected.
    pub async fn mutate(&self, path: &str, body: Option<&Value>) -> LuoguResult<RawPayload> {
        let page = self.inner.config.csrf_page.clone();
        self.mutate_via(path, body, &page).await
    }

    /// Like [`mutate`](Self::mutate), resolving the token from `csrf_page`.
    pub async fn mutate_via(
        &self,
        path: &str,
        body: Option<&Value>,
        csrf_page: &str,
    ) -> LuoguResult<RawPayload> {
        let token = resolve_csrf_token(self, csrf_page).await?;

        debug!("Posting {}", path);
        let mut request = self.request(Method::POST, path).header(CSRF_HEADER, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?.error_for_status()?;
        let text = response.text().await?;
        into_object(serde_json::from_str(&text)?)
    }
}

impl Default for LuoguClient {
    fn default() -> Self {
        Self::shared().clone()
    }
}

impl fmt::Debug for LuoguClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuoguClient")
            .field("base_url", &self.inner.config.base_url)
            .field("cookies", &self.inner.jar.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn into_object(value: Value) -> LuoguResult<RawPayload> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LuoguError::MalformedPayload(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Dispatches a decoded body into the error taxonomy.
pub(crate) fn check_code(body: &RawPayload) -> LuoguResult<()> {
    let code = body
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| LuoguError::MalformedPayload("missing integer `code`".to_string()))?;

    let message = body
        .get("currentData")
        .and_then(|data| data.get("errorMessage"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match LuoguError::from_code(code, message) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Returns `currentData` from a checked content-only body.
pub(crate) fn current_data(mut body: RawPayload) -> LuoguResult<RawPayload> {
    match body.remove("currentData") {
        Some(Value::Object(data)) => Ok(data),
        _ => Err(LuoguError::MalformedPayload(
            "missing object `currentData`".to_string(),
        )),
    }
}
