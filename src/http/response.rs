//! Response handling and transformation.
//!
//! # Responsibilities
//! - Copy upstream response headers onto the client response
//! - Build the JSON error envelopes clients receive on failure
//!
//! # Design Decisions
//! - Framing headers are dropped because the relay may re-frame the body
//! - `content-type` is re-applied last so it is never lost
//! - Clients see a minimal envelope; details stay in the logs

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Upstream headers that never reach the client.
pub const EXCLUDED_RESPONSE_HEADERS: [&str; 4] = [
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
];

/// Error string for failures before an upstream response arrived.
pub const PROXY_REQUEST_FAILED: &str = "proxy request failed";

/// Error string for failures while relaying an upstream response.
pub const PROXY_RESPONSE_FAILED: &str = "proxy response processing failed";

/// Body of the 500 returned when the upstream round-trip fails.
#[derive(Debug, Serialize)]
pub struct RequestFailure<'a> {
    pub error: &'static str,
    pub message: &'a str,
}

/// Body of the 502 returned when every relay tier fails.
#[derive(Debug, Serialize)]
pub struct RelayFailure {
    pub error: &'static str,
}

/// Copy upstream headers minus the excluded framing headers.
///
/// Repeated headers keep every value. `content-type` is set again at the end.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if EXCLUDED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }
    if let Some(content_type) = upstream.get(header::CONTENT_TYPE) {
        relayed.insert(header::CONTENT_TYPE, content_type.clone());
    }
    relayed
}

/// 500 with `{"error": "proxy request failed", "message": ...}`.
pub fn proxy_request_failed(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RequestFailure {
            error: PROXY_REQUEST_FAILED,
            message,
        }),
    )
        .into_response()
}

/// 502 with `{"error": "proxy response processing failed"}`.
pub fn proxy_response_failed() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(RelayFailure {
            error: PROXY_RESPONSE_FAILED,
        }),
    )
        .into_response()
}
