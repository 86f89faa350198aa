//! Upstream URL construction.
//!
//! The upstream URL is the base origin, one `/`, then the post-prefix path.
//! Every run of slashes outside the scheme separator collapses to one, so
//! redundant slashes in either operand never reach the upstream.

use axum::http::Uri;

use crate::proxy::error::ForwardError;

const SCHEME_SEPARATOR: &str = "://";

/// The fixed upstream origin requests are rewritten onto.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base: String,
}

impl UpstreamTarget {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Join the base with a relative path and normalize slashes.
    pub fn join(&self, relative: &str) -> String {
        collapse_slashes(&format!("{}/{}", self.base, relative))
    }

    /// Build the full upstream URI, carrying the inbound query unchanged.
    pub fn resolve(&self, relative: &str, query: Option<&str>) -> Result<Uri, ForwardError> {
        let mut url = self.join(relative);
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url.parse::<Uri>()
            .map_err(|source| ForwardError::InvalidTarget { url, source })
    }
}

/// Collapse runs of `/` into one, leaving the first `://` intact.
pub fn collapse_slashes(url: &str) -> String {
    let (head, tail) = match url.find(SCHEME_SEPARATOR) {
        Some(idx) => url.split_at(idx + SCHEME_SEPARATOR.len()),
        None => ("", url),
    };

    let mut out = String::with_capacity(url.len());
    out.push_str(head);
    let mut previous_slash = false;
    for ch in tail.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out
}
