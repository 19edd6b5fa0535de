//! Connection-level error types.

use blocknative_core::DecodeError;
use thiserror::Error;

/// Errors that can occur while talking to the service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Scheme/host/path do not form a WebSocket URL.
    #[error("invalid endpoint {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The WebSocket handshake failed.
    #[error("WebSocket connect failed: {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Send/receive error on an open socket.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Outbound message could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Inbound frame could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The service answered with `status: "error"`.
    #[error("rejected by service: {reason}")]
    Rejected { reason: String },

    /// The socket is closed.
    #[error("connection closed")]
    Closed,
}

impl ClientError {
    /// Returns `true` if reconnecting may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::WebSocket(_) | Self::Closed)
    }
}
