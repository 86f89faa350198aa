//! Route matching logic.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matching works on the raw (still percent-encoded) request path
//! - No regex, a prefix comparison is all that is needed

/// Matches and strips a request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Remove a single leading occurrence of the prefix.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api_proxy/");

        assert!(matcher.strip("/api_proxy/v1/items").is_some());
        assert!(matcher.strip("/api_proxy/").is_some());
        assert!(matcher.strip("/api_proxy").is_none());
        assert!(matcher.strip("/API_PROXY/v1").is_none());
        assert!(matcher.strip("/images/logo.png").is_none());
    }

    #[test]
    fn strips_exactly_one_occurrence() {
        let matcher = PathPrefixMatcher::new("/api_proxy/");

        assert_eq!(matcher.strip("/api_proxy/v1/items"), Some("v1/items"));
        assert_eq!(
            matcher.strip("/api_proxy//api_proxy/x"),
            Some("/api_proxy/x")
        );
        assert_eq!(matcher.strip("/api_proxy/"), Some(""));
        assert_eq!(matcher.strip("/static/api_proxy/x"), None);
    }
}
