use thiserror::Error;

use yutnori_protocol::RoomId;

/// Errors surfaced by [`crate::RoomHandle`] calls. The room actor never
/// reports illegal-but-well-formed actions this way — those become
/// negative-form broadcasts or responses per the action's own rules.
/// This only covers the mailbox itself being gone.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room {0} is no longer running")]
    Unavailable(RoomId),
}
