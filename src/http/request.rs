//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Strip headers that describe the client's own connection
//! - Prepare the request for forwarding upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The inbound body is streamed upstream byte for byte, never re-encoded
//! - GET and HEAD never carry a body upstream

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, Uri},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::proxy::error::ForwardError;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Inbound headers that are never sent upstream.
pub const EXCLUDED_REQUEST_HEADERS: [&str; 3] = ["host", "origin", "referer"];

/// Generates v4 UUID request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Read the request ID from a request, or "unknown".
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Copy inbound headers minus `host`, `origin` and `referer`.
///
/// `HeaderMap` names are lowercase, so removal is case-insensitive.
pub fn sanitize_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = headers.clone();
    for name in EXCLUDED_REQUEST_HEADERS {
        sanitized.remove(name);
    }
    sanitized
}

/// Whether the method forwards a body.
pub fn carries_body(method: &Method) -> bool {
    !(method == Method::GET || method == Method::HEAD)
}

/// Build the upstream request: same method, sanitized headers, raw body.
pub fn prepare_upstream_request(
    request: Request<Body>,
    target: Uri,
) -> Result<Request<Body>, ForwardError> {
    let (parts, body) = request.into_parts();

    let mut headers = sanitize_request_headers(&parts.headers);
    let body = if carries_body(&parts.method) {
        body
    } else {
        // The body is dropped, so its framing headers go too.
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);
        Body::empty()
    };

    let mut upstream = Request::builder()
        .method(parts.method)
        .uri(target)
        .body(body)?;
    *upstream.headers_mut() = headers;
    Ok(upstream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    fn inbound(method: Method, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api_proxy/v1/items")
            .header("Host", "gateway.local")
            .header("Origin", "http://app.local")
            .header("REFERER", "http://app.local/page")
            .header("Authorization", "Bearer token")
            .header("Cookie", "session=abc")
            .header("Content-Type", "application/octet-stream")
            .header("Content-Length", body.len().to_string())
            .body(Body::from(body))
            .unwrap()
    }

    fn target() -> Uri {
        "http://api.example.com:81/v1/items".parse().unwrap()
    }

    #[test]
    fn excluded_headers_removed_regardless_of_case() {
        let mut headers = HeaderMap::new();
        headers.insert("HOST".parse::<HeaderName>().unwrap(), HeaderValue::from_static("a"));
        headers.insert("Origin".parse::<HeaderName>().unwrap(), HeaderValue::from_static("b"));
        headers.insert("referer", HeaderValue::from_static("c"));
        headers.insert("x-custom", HeaderValue::from_static("d"));

        let sanitized = sanitize_request_headers(&headers);
        assert!(sanitized.get("host").is_none());
        assert!(sanitized.get("origin").is_none());
        assert!(sanitized.get("referer").is_none());
        assert_eq!(sanitized.get("x-custom").unwrap(), "d");
    }

    #[test]
    fn repeated_headers_survive_sanitizing() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let sanitized = sanitize_request_headers(&headers);
        assert_eq!(sanitized.get_all("accept").iter().count(), 2);
    }

    #[tokio::test]
    async fn post_forwards_raw_body_and_credentials() {
        let upstream = prepare_upstream_request(inbound(Method::POST, "\x00binary=1&x"), target())
            .unwrap();

        assert_eq!(upstream.method(), Method::POST);
        assert_eq!(upstream.uri(), &target());
        let headers = upstream.headers();
        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::ORIGIN).is_none());
        assert!(headers.get(header::REFERER).is_none());
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer token");
        assert_eq!(headers.get(header::COOKIE).unwrap(), "session=abc");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "11");

        let body = axum::body::to_bytes(upstream.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\x00binary=1&x");
    }

    #[tokio::test]
    async fn get_and_head_send_no_body() {
        for method in [Method::GET, Method::HEAD] {
            let upstream =
                prepare_upstream_request(inbound(method.clone(), "ignored"), target()).unwrap();
            assert_eq!(upstream.method(), method);
            assert!(upstream.headers().get(header::CONTENT_LENGTH).is_none());
            let body = axum::body::to_bytes(upstream.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty(), "{method} must not carry a body");
        }
    }

    #[test]
    fn request_id_falls_back_to_unknown() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(req.request_id(), "unknown");

        let req = Request::builder().header(X_REQUEST_ID, "abc-123").body(()).unwrap();
        assert_eq!(req.request_id(), "abc-123");
    }

    #[test]
    fn generated_request_ids_are_uuids() {
        let req = Request::builder().body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }
}
