use std::time::Duration;

use crate::support::errors::TransportError;

/// How a client call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx and a success status code.
    Success,
    /// 2xx, but the remote reported a non-success status code.
    ProtocolFault,
    /// Non-2xx HTTP status.
    HttpError(u16),
    /// No HTTP reply at all: connection failure or timeout.
    Transport(TransportError),
    /// Anything else: refused before sending, cancelled, or an unreadable
    /// body.
    Exception(String),
}

/// Result of one client call. `content` is always present; on failures it is
/// a synthesized error response carrying the reason.
#[derive(Debug, Clone)]
pub struct ClientResponse<Resp> {
    pub content: Resp,
    pub outcome: Outcome,
    pub http_status: Option<u16>,
    pub raw_body: Option<String>,
    pub runtime: Duration,
}

impl<Resp> ClientResponse<Resp> {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// HTTP error or no reply from the transport.
    pub fn is_transport_error(&self) -> bool {
        matches!(self.outcome, Outcome::HttpError(_) | Outcome::Transport(_))
    }

    pub fn is_exception(&self) -> bool {
        matches!(self.outcome, Outcome::Exception(_))
    }
}
