//! CSRF token extraction.
//!
//! Every mutating request carries a token taken from a
//! `<meta name="csrf-token" content="...">` tag on an ordinary HTML page.
//! Tokens are fetched fresh for each mutation and never cached.

use crate::error::{LuoguError, LuoguResult};
use crate::http::LuoguClient;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Matches a comment or a raw-text element (both skipped), or a `meta` start
/// tag (group 1: attributes). A `>` inside a quoted attribute value does not
/// end a tag.
static META_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    const ATTRS: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;
    let pattern = format!(
        r"(?is)<!--.*?-->|<script\b{ATTRS}>.*?</script\s*>|<style\b{ATTRS}>.*?</style\s*>|<textarea\b{ATTRS}>.*?</textarea\s*>|<meta\b({ATTRS})>"
    );
    Regex::new(&pattern).unwrap()
});

/// Matches one attribute: name, then an optional double-quoted,
/// single-quoted or bare value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Scans start tags in document order and returns the `content` of the first
/// `meta` tag whose `name` is `csrf-token`.
///
/// Scanning stops at the first match; the rest of the document is never
/// looked at.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    META_TAG_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .find_map(|attrs| {
            let mut name = None;
            let mut content = None;
            for attr in ATTR_RE.captures_iter(attrs.as_str()) {
                let key = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map_or("", |m| m.as_str());
                match key.as_str() {
                    "name" if name.is_none() => name = Some(value),
                    "content" if content.is_none() => content = Some(value),
                    _ => {}
                }
            }
            match (name, content) {
                (Some("csrf-token"), Some(token)) if !token.is_empty() => Some(unescape(token)),
                _ => None,
            }
        })
}

/// Fetches `page` as a full HTML document and extracts its CSRF token.
pub async fn resolve_csrf_token(client: &LuoguClient, page: &str) -> LuoguResult<String> {
    debug!("Resolving CSRF token from {}", page);
    let html = client.fetch_html(page).await?;
    extract_csrf_token(&html).ok_or_else(|| LuoguError::TokenNotFound {
        page: client.config().url(page),
    })
}

/// Decodes the handful of character references that can appear in a token.
fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
