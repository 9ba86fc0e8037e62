use thiserror::Error;

use yutnori_protocol::ClientId;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("it is not {0}'s turn")]
    NotYourTurn(ClientId),

    #[error("piece index {0} is out of range")]
    UnknownPiece(u8),

    #[error("action is not valid in the current game state")]
    InvalidState,
}
