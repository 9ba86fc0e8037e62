//! One room, one mailbox: the actor that owns a room's members and its
//! game instance, serializing every mutation behind a single tokio
//! task.

mod error;
mod room;

pub use error::RoomError;
pub use room::{spawn_room, OutboundSender, RoomEvent, RoomHandle};
