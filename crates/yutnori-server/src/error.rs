//! Top-level error type for the server binary, wrapping each layer's
//! own error into one public, documented aggregate.

use thiserror::Error;

use yutnori_protocol::ProtocolError;
use yutnori_room::RoomError;
use yutnori_transport::TransportError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),
}
