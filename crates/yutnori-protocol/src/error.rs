//! Errors produced while framing or decoding protocol messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame payload of {0} bytes exceeds the 65535-byte limit")]
    PayloadTooLarge(usize),

    #[error("unknown frame kind byte: {0}")]
    UnknownKind(u8),

    #[error("failed to encode payload as JSON")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode payload as JSON")]
    Decode(#[source] serde_json::Error),
}
