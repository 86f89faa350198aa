//! Upstream body relay with ordered fallback tiers.
//!
//! # State Machine
//! ```text
//! Streaming ──err──▶ Buffering ──err──▶ TextDecoding ──err──▶ Failed
//!     │                  │                   │
//!     └──────ok──────────┴────────ok─────────┴──────────────▶ Done
//! ```
//!
//! A tier is only attempted when the previous one raised an error. An
//! empty body is a successful transfer, not an error.
//!
//! # Design Decisions
//! - Tiers run against a `BodySource`, so the chain does not care where
//!   the bytes come from
//! - Only the first streamed frame can still fall back; once it has been
//!   handed to the client a later stream error aborts the response
//! - Dropping the streamed body (client gone) drops the upstream body,
//!   which closes the upstream connection

use axum::body::Body;
use bytes::Bytes;
use futures_util::{future::BoxFuture, stream, StreamExt, TryStreamExt};

use crate::proxy::error::RelayError;

/// Relay progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Streaming,
    Buffering,
    TextDecoding,
    Failed,
    Done,
}

impl RelayState {
    /// Next state after the current tier succeeded or failed.
    pub fn advance(self, succeeded: bool) -> Self {
        match (self, succeeded) {
            (Self::Done, _) | (Self::Failed, _) => self,
            (_, true) => Self::Done,
            (Self::Streaming, false) => Self::Buffering,
            (Self::Buffering, false) => Self::TextDecoding,
            (Self::TextDecoding, false) => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Streaming => "stream",
            Self::Buffering => "buffer",
            Self::TextDecoding => "text",
            Self::Failed => "failed",
            Self::Done => "done",
        }
    }
}

/// A response body that can be read in one of three ways.
///
/// Each call may consume the body; later calls then fail with
/// `RelayError::Consumed`. The buffer and text tiers only recover for
/// sources that can still be read after a failed `open_stream`. A live
/// upstream body cannot be replayed, so for [`UpstreamBody`] a stream
/// failure exhausts the chain and `limit` is never reached.
pub trait BodySource: Send {
    /// Open the body as a stream of frames.
    fn open_stream(&mut self) -> BoxFuture<'_, Result<Body, RelayError>>;

    /// Read the whole body, failing past `limit` bytes.
    fn read_bytes(&mut self, limit: usize) -> BoxFuture<'_, Result<Bytes, RelayError>>;

    /// Read the whole body and decode it as UTF-8.
    fn read_text(&mut self, limit: usize) -> BoxFuture<'_, Result<String, RelayError>>;
}

/// The body of an upstream response.
///
/// Single use: whichever tier runs first takes the body.
pub struct UpstreamBody {
    body: Option<Body>,
}

impl UpstreamBody {
    pub fn new(body: Body) -> Self {
        Self { body: Some(body) }
    }

    fn take(&mut self) -> Result<Body, RelayError> {
        self.body.take().ok_or(RelayError::Consumed)
    }
}

impl BodySource for UpstreamBody {
    fn open_stream(&mut self) -> BoxFuture<'_, Result<Body, RelayError>> {
        Box::pin(async move {
            let mut frames = self.take()?.into_data_stream();
            match frames.next().await {
                None => Ok(Body::empty()),
                Some(Err(e)) => Err(RelayError::Stream(e)),
                Some(Ok(first)) => {
                    let rest = frames.inspect_err(|e| {
                        tracing::warn!(error = %e, "Upstream body interrupted mid-stream");
                    });
                    let head = stream::iter([Ok::<_, axum::Error>(first)]);
                    Ok(Body::from_stream(head.chain(rest)))
                }
            }
        })
    }

    fn read_bytes(&mut self, limit: usize) -> BoxFuture<'_, Result<Bytes, RelayError>> {
        Box::pin(async move {
            let body = self.take()?;
            axum::body::to_bytes(body, limit)
                .await
                .map_err(RelayError::Buffer)
        })
    }

    fn read_text(&mut self, limit: usize) -> BoxFuture<'_, Result<String, RelayError>> {
        Box::pin(async move {
            let bytes = self.read_bytes(limit).await?;
            Ok(String::from_utf8(bytes.to_vec())?)
        })
    }
}

/// A tier that raised an error.
#[derive(Debug)]
pub struct TierFailure {
    pub tier: RelayState,
    pub error: RelayError,
}

/// Result of running the tier chain.
#[derive(Debug)]
pub enum RelayOutcome {
    /// `tier` produced the client body after `failures` earlier attempts.
    Delivered {
        tier: RelayState,
        body: Body,
        failures: Vec<TierFailure>,
    },
    /// Every tier failed.
    Exhausted { failures: Vec<TierFailure> },
}

impl RelayOutcome {
    /// Terminal state reached.
    pub fn state(&self) -> RelayState {
        match self {
            Self::Delivered { .. } => RelayState::Done,
            Self::Exhausted { .. } => RelayState::Failed,
        }
    }

    pub fn failures(&self) -> &[TierFailure] {
        match self {
            Self::Delivered { failures, .. } | Self::Exhausted { failures } => failures,
        }
    }
}

/// Run stream → buffer → text until one tier succeeds.
pub async fn relay_body<S>(source: &mut S, max_buffer_bytes: usize) -> RelayOutcome
where
    S: BodySource + ?Sized,
{
    let mut state = RelayState::Streaming;
    let mut failures = Vec::new();

    while !state.is_terminal() {
        let tier = state;
        let attempt = match tier {
            RelayState::Streaming => source.open_stream().await,
            RelayState::Buffering => source.read_bytes(max_buffer_bytes).await.map(Body::from),
            RelayState::TextDecoding => source.read_text(max_buffer_bytes).await.map(Body::from),
            RelayState::Failed | RelayState::Done => break,
        };

        match attempt {
            Ok(body) => {
                tracing::trace!(tier = tier.as_str(), "Relay tier succeeded");
                return RelayOutcome::Delivered {
                    tier,
                    body,
                    failures,
                };
            }
            Err(error) => {
                failures.push(TierFailure { tier, error });
                state = state.advance(false);
            }
        }
    }

    RelayOutcome::Exhausted { failures }
}
