//! Inbound decode errors.

use thiserror::Error;

/// Errors that can occur while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not JSON, or does not fit the event schema.
    #[error("malformed event frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary frame whose bytes are not UTF-8 text.
    #[error("binary frame is not UTF-8 ({len} bytes)")]
    Binary { len: usize },
}
