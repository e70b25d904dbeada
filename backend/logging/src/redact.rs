//! Log Redaction Layer
//!
//! Signed CDN URLs carry credentials in their query string. Strip them before
//! a URL, or an error message quoting one, reaches the logs.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://[^\s?#)]+)[?#][^\s)]*").unwrap());
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());

/// Drop query string and fragment from a URL.
pub fn redact_url(url: &Url) -> String {
    let mut clean = url.clone();
    let had_query = clean.query().is_some() || clean.fragment().is_some();
    clean.set_query(None);
    clean.set_fragment(None);
    if had_query {
        format!("{clean}?[REDACTED]")
    } else {
        clean.to_string()
    }
}

/// Redacts sensitive patterns in free text.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = URL_QUERY_RE.replace_all(input, "$1?[REDACTED]");
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string()
}
