//! One upstream round-trip per inbound request.
//!
//! # Responsibilities
//! - Build the upstream URI from the stripped path
//! - Send method, sanitized headers and raw body upstream
//! - Relay status, headers and body back through the tier chain
//!
//! # Design Decisions
//! - No retries: the chain changes how a received response is relayed,
//!   never whether the upstream is called again
//! - No request deadline here; the transport layer and connector own timeouts
//! - Stateless between requests apart from the pooled client

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    response::IntoResponse,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::config::{ProxyConfig, UpstreamConfig};
use crate::http::middleware::UpstreamCorsHeaders;
use crate::http::request::{prepare_upstream_request, RequestIdExt};
use crate::http::response::{proxy_response_failed, relay_headers};
use crate::observability::metrics;
use crate::proxy::error::{error_chain, ForwardError};
use crate::proxy::relay::{relay_body, RelayOutcome, UpstreamBody};
use crate::proxy::target::UpstreamTarget;

/// Upstream HTTP client type.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Forwards proxied requests to the fixed upstream origin.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    target: UpstreamTarget,
    max_buffer_bytes: usize,
}

impl Forwarder {
    pub fn new(upstream: &UpstreamConfig, proxy: &ProxyConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(upstream.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(upstream.pool_idle_timeout_secs))
            .build(connector);

        Self {
            client,
            target: UpstreamTarget::new(upstream.base_url.clone()),
            max_buffer_bytes: proxy.max_buffer_bytes,
        }
    }

    /// Forward `request` to `relative` under the upstream base and relay the reply.
    pub async fn forward(&self, relative: &str, request: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let method = request.method().clone();
        let request_id = request.request_id().to_string();
        let query = request.uri().query().map(str::to_string);

        let response = match self.round_trip(relative, query.as_deref(), request).await {
            Ok((url, upstream)) => self.relay(&request_id, &method, &url, upstream).await,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    upstream = %self.target.base(),
                    relative = %relative,
                    error = %error_chain(&e),
                    "Proxy request failed"
                );
                metrics::record_upstream_error();
                e.into_response()
            }
        };

        metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
        response
    }

    /// Build and send the upstream request. Everything before the
    /// response head arrives fails here.
    async fn round_trip(
        &self,
        relative: &str,
        query: Option<&str>,
        request: Request<Body>,
    ) -> Result<(String, Response<hyper::body::Incoming>), ForwardError> {
        let uri = self.target.resolve(relative, query)?;
        let url = uri.to_string();
        let upstream_request = prepare_upstream_request(request, uri)?;

        tracing::debug!(
            method = %upstream_request.method(),
            url = %url,
            "Forwarding upstream"
        );

        let response = self.client.request(upstream_request).await?;
        Ok((url, response))
    }

    /// Relay an upstream response: exact status, filtered headers, tiered body.
    async fn relay(
        &self,
        request_id: &str,
        method: &Method,
        url: &str,
        upstream: Response<hyper::body::Incoming>,
    ) -> Response<Body> {
        let (parts, body) = upstream.into_parts();

        tracing::info!(
            request_id = %request_id,
            status = parts.status.as_u16(),
            content_type = ?parts.headers.get(header::CONTENT_TYPE),
            "Upstream responded"
        );

        let mut source = UpstreamBody::new(Body::new(body));
        let outcome = relay_body(&mut source, self.max_buffer_bytes).await;

        for failure in outcome.failures() {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                url = %url,
                tier = failure.tier.as_str(),
                error = %error_chain(&failure.error),
                "Relay tier failed"
            );
        }

        match outcome {
            RelayOutcome::Delivered { tier, body, .. } => {
                metrics::record_relay(tier.as_str(), true);
                let mut response = Response::new(body);
                *response.status_mut() = parts.status;
                *response.headers_mut() = relay_headers(&parts.headers);
                if let Some(cors) = UpstreamCorsHeaders::capture(&parts.headers) {
                    response.extensions_mut().insert(cors);
                }
                response
            }
            RelayOutcome::Exhausted { .. } => {
                metrics::record_relay("all", false);
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    url = %url,
                    "All relay tiers failed"
                );
                proxy_response_failed()
            }
        }
    }
}
