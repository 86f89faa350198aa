//! Transparent HTTP forwarding gateway library.
//!
//! Requests under a path prefix are rewritten onto one fixed upstream
//! origin and relayed back; every other path is served from a static tree.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
