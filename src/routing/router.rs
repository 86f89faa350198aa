//! Route lookup and dispatch.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The proxy prefix is checked before anything else, so the static
//!   tree can never shadow a proxied path
//! - Explicit `Route::Static` rather than a silent default

use crate::config::ProxyConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Forward upstream. `relative` is the path with the prefix removed.
    Proxy { relative: &'a str },
    /// Hand to the static file tree.
    Static,
}

/// Binary dispatcher between the forwarder and static files.
#[derive(Debug, Clone)]
pub struct Router {
    proxy: PathPrefixMatcher,
}

impl Router {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            proxy: PathPrefixMatcher::new(prefix),
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(config.prefix.clone())
    }

    /// Decide where a request path is handled.
    pub fn dispatch<'a>(&self, path: &'a str) -> Route<'a> {
        match self.proxy.strip(path) {
            Some(relative) => Route::Proxy { relative },
            None => Route::Static,
        }
    }
}
