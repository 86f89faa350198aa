//! Forwarding and relay error definitions.

use std::error::Error as StdError;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::proxy_request_failed;

/// Errors that end a forward before an upstream response arrives.
///
/// All of them map to a 500 with the `{"error", "message"}` envelope.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The joined upstream URL is not a valid URI.
    #[error("invalid upstream url '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    /// The outgoing request could not be assembled.
    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    /// Connect, DNS, send or connect-timeout failure.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ForwardError {
    /// The message reported to clients: this error followed by its causes.
    pub fn client_message(&self) -> String {
        error_chain(self)
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        proxy_request_failed(&self.client_message())
    }
}

/// Errors raised by a single relay tier while transferring the upstream body.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The body could not be opened as a stream.
    #[error("stream transfer failed: {0}")]
    Stream(#[source] axum::Error),

    /// Reading the body into memory failed or exceeded the buffer limit.
    #[error("buffered transfer failed: {0}")]
    Buffer(#[source] axum::Error),

    /// The body is not valid UTF-8 text.
    #[error("text decoding failed: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// An earlier tier already took the body.
    #[error("upstream body already consumed")]
    Consumed,
}

/// Render an error and its `source()` chain as "outer: inner: root".
///
/// Display strings that already embed their source are not repeated.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Leaf;

    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl StdError for Leaf {}

    #[derive(Debug)]
    struct Wrapper(Leaf);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn chain_includes_causes() {
        assert_eq!(
            error_chain(&Wrapper(Leaf)),
            "client error (Connect): connection refused"
        );
    }

    #[test]
    fn chain_skips_causes_already_in_message() {
        let err = RelayError::Decode(String::from_utf8(vec![0xff]).unwrap_err());
        let message = error_chain(&err);
        assert_eq!(message.matches("invalid utf-8").count(), 1);
    }
}
