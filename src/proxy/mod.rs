//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! stripped path + inbound request
//!     → target.rs (base + "/" + path, slashes collapsed)
//!     → http/request.rs (sanitize headers, select body)
//!     → forwarder.rs (upstream round-trip)
//!     → http/response.rs (status and header relay)
//!     → relay.rs (stream → buffer → text)
//!     → client response
//! ```
//!
//! Failures before the upstream answers are 500s; failures of every
//! relay tier are 502s. See `error.rs`.

pub mod error;
pub mod forwarder;
pub mod relay;
pub mod target;

pub use error::{ForwardError, RelayError};
pub use forwarder::Forwarder;
pub use relay::{relay_body, BodySource, RelayOutcome, RelayState, UpstreamBody};
pub use target::UpstreamTarget;
