//! Errors produced while accepting connections or moving frames over them.

use thiserror::Error;

use yutnori_protocol::ProtocolError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("i/o error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
