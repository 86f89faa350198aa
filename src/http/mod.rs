//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → middleware/cors.rs (preflight, cross-origin headers)
//!     → request.rs (request ID, sanitize headers, select body)
//!     → [forwarder issues the upstream request]
//!     → response.rs (relay headers, error envelopes)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
