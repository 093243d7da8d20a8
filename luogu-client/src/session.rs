//! Authenticated sessions.
//!
//! A [`Session`] owns one cookie-bearing HTTP client. Entities fetched
//! through a session keep a handle on that client, so their lazy references
//! and mutations run as the session's user. Sessions never share a client
//! with each other or with [`LuoguClient::shared`].

use crate::config::ClientConfig;
use crate::error::{LuoguError, LuoguResult};
use crate::http::LuoguClient;
use crate::lazy::LazyList;
use crate::models::{Paste, Problem, ProblemList, ProblemQuery, User};
use luogu_types::{PasteId, Pid, RawPayload, Uid};
use reqwest::Url;
use reqwest::cookie::Jar;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Cookie attribute names that never name a cookie in a header string.
const COOKIE_ATTRIBUTES: &[&str] = &[
    "path", "domain", "expires", "max-age", "secure", "httponly", "samesite", "version", "comment",
];

/// Where a session's initial cookies come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CookieSource {
    /// No cookies; log in to obtain some.
    #[default]
    Empty,
    /// A `Cookie:` header value such as `__client_id=abc; _uid=1`.
    Header(String),
    /// Explicit name/value pairs.
    Pairs(BTreeMap<String, String>),
}

impl CookieSource {
    /// Normalizes the source into name/value pairs.
    pub fn into_pairs(self) -> BTreeMap<String, String> {
        match self {
            Self::Empty => BTreeMap::new(),
            Self::Header(header) => parse_cookie_header(&header),
            Self::Pairs(pairs) => pairs,
        }
    }
}

impl From<&str> for CookieSource {
    fn from(header: &str) -> Self {
        Self::Header(header.to_string())
    }
}

impl From<String> for CookieSource {
    fn from(header: String) -> Self {
        Self::Header(header)
    }
}

impl From<BTreeMap<String, String>> for CookieSource {
    fn from(pairs: BTreeMap<String, String>) -> Self {
        Self::Pairs(pairs)
    }
}

impl From<HashMap<String, String>> for CookieSource {
    fn from(pairs: HashMap<String, String>) -> Self {
        Self::Pairs(pairs.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CookieSource {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<Option<String>> for CookieSource {
    fn from(header: Option<String>) -> Self {
        header.map_or(Self::Empty, Self::Header)
    }
}

/// Parses a `Cookie:` header value into name/value pairs.
///
/// Pairs are `;`-separated; whitespace around names and values is trimmed
/// and a value wrapped in double quotes is unwrapped. Entries without `=`
/// and cookie attribute names (`Path`, `Domain`, ...) are skipped. Later
/// duplicates win.
pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            let name = name.trim();
            if name.is_empty() || COOKIE_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()) {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// An authenticated context with its own cookie jar and HTTP client.
#[derive(Debug)]
pub struct Session {
    client: LuoguClient,
    jar: Arc<Jar>,
}

impl Session {
    /// Opens a session against the default site.
    pub fn open(cookies: impl Into<CookieSource>) -> LuoguResult<Self> {
        Self::open_with_config(ClientConfig::default(), cookies)
    }

    /// Opens a session with an empty jar, ready to [`login`](Self::login).
    pub fn anonymous() -> LuoguResult<Self> {
        Self::open(CookieSource::Empty)
    }

    /// Opens a session with explicit client settings.
    ///
    /// The referer defaults to the site root when the config leaves it unset.
    pub fn open_with_config(
        mut config: ClientConfig,
        cookies: impl Into<CookieSource>,
    ) -> LuoguResult<Self> {
        let site = Url::parse(&config.site_root())
            .map_err(|e| LuoguError::Config(format!("invalid base url {:?}: {e}", config.base_url)))?;
        if config.referer.is_none() {
            config.referer = Some(config.site_root());
        }

        let jar = Arc::new(Jar::default());
        let pairs = cookies.into().into_pairs();
        for (name, value) in &pairs {
            jar.add_cookie_str(&format!("{name}={value}"), &site);
        }
        debug!("Opened session for {} with {} cookies", site, pairs.len());

        let client = LuoguClient::with_cookie_jar(config, Arc::clone(&jar))?;
        Ok(Self { client, jar })
    }

    /// The client every entity fetched through this session uses.
    pub fn client(&self) -> &LuoguClient {
        &self.client
    }

    /// The session's cookie jar, updated by `Set-Cookie` responses.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    pub async fn user(&self, uid: Uid) -> LuoguResult<User> {
        User::fetch(&self.client, uid).await
    }

    pub async fn search_users(&self, keyword: &str) -> LuoguResult<LazyList<User>> {
        User::search(&self.client, keyword).await
    }

    pub async fn problem(&self, pid: &Pid) -> LuoguResult<Problem> {
        Problem::fetch(&self.client, pid).await
    }

    pub async fn problem_list(&self, query: &ProblemQuery) -> LuoguResult<ProblemList> {
        ProblemList::fetch(&self.client, query).await
    }

    pub async fn paste(&self, id: &PasteId) -> LuoguResult<Paste> {
        Paste::fetch(&self.client, id).await
    }

    pub async fn create_paste(&self, data: &str, public: Option<bool>) -> LuoguResult<Paste> {
        Paste::create(&self.client, data, public).await
    }

    /// Fetches a captcha image for [`login`](Self::login).
    pub async fn captcha(&self) -> LuoguResult<Vec<u8>> {
        self.client.fetch_bytes("/api/verify/captcha").await
    }

    /// Logs in with a password and captcha solution.
    ///
    /// The CSRF token comes from the login page. Cookies set by the server
    /// land in this session's jar. Returns the response body unchanged.
    pub async fn login(&self, username: &str, password: &str, captcha: &str) -> LuoguResult<Value> {
        let body = json!({
            "username": username,
            "password": password,
            "captcha": captcha,
        });
        let login_page = self.client.config().login_page.clone();
        let response = self
            .client
            .mutate_via("/api/auth/userPassLogin", Some(&body), &login_page)
            .await?;
        info!("Logged in as {}", username);
        Ok(Value::Object(response))
    }

    /// Logs out on the server. The local jar is left as it is.
    pub async fn logout(&self) -> LuoguResult<Value> {
        let response: RawPayload = self.client.mutate("/api/auth/logout", None).await?;
        info!("Logged out");
        Ok(Value::Object(response))
    }
}
