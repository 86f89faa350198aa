//! Middleware applied ahead of routing.

pub mod cors;

pub use cors::{cors_layer, restore_upstream_cors, UpstreamCorsHeaders};
