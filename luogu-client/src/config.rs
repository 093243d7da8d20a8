//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default site root of the content API.
pub const DEFAULT_BASE_URL: &str = "https://www.luogu.com.cn";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) ",
    "luogu-client/",
    env!("CARGO_PKG_VERSION")
);

/// Settings shared by every request a [`LuoguClient`](crate::LuoguClient)
/// issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site root, without a trailing slash (e.g. `https://www.luogu.com.cn`).
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// `Referer` header value. Sessions default this to the site root.
    pub referer: Option<String>,
    /// Deadline applied to each request unless overridden per handle.
    pub request_timeout_secs: u64,
    /// Page scanned for a CSRF token before ordinary mutations.
    pub csrf_page: String,
    /// Page scanned for a CSRF token before logging in.
    pub login_page: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
            request_timeout_secs: 30,
            csrf_page: "/".to_string(),
            login_page: "/auth/login".to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration pointed at another site root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Joins a path or absolute URL onto the site root.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// The site root with a trailing slash, used as the session referer.
    pub fn site_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}
