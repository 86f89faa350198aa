//! Cross-origin policy applied ahead of routing.
//!
//! Origins are mirrored from the request so credentials can be allowed.
//! Preflight `OPTIONS` requests are answered here for every path and
//! never reach the forwarder; they get `200 OK` with an empty body.
//!
//! Proxied responses that carry their own `access-control-*` headers keep
//! them: the layer's values are replaced by the upstream's on the way out.

use axum::{
    http::{HeaderMap, HeaderName, Method},
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Build the CORS layer from configuration.
///
/// Entries that fail to parse are skipped; validation reports them at startup.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
}

/// `access-control-*` headers relayed from the upstream, stashed in the
/// response extensions so they can be restored after `CorsLayer` runs.
#[derive(Debug, Clone)]
pub struct UpstreamCorsHeaders(HeaderMap);

impl UpstreamCorsHeaders {
    /// Collect the upstream's `access-control-*` headers, if it sent any.
    pub fn capture(headers: &HeaderMap) -> Option<Self> {
        let mut cors = HeaderMap::new();
        for (name, value) in headers {
            if name.as_str().starts_with("access-control-") {
                cors.append(name.clone(), value.clone());
            }
        }
        (!cors.is_empty()).then_some(Self(cors))
    }
}

/// Put relayed upstream CORS headers back over the layer's own values.
pub async fn restore_upstream_cors(mut response: Response) -> Response {
    if let Some(UpstreamCorsHeaders(upstream)) = response.extensions_mut().remove() {
        let headers = response.headers_mut();
        for name in upstream.keys() {
            headers.remove(name);
        }
        for (name, value) in &upstream {
            headers.append(name.clone(), value.clone());
        }
    }
    response
}
