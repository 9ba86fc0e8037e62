//! Wire types shared between the server and any client: identifiers,
//! board cells, the message taxonomy, and the frame codec built on
//! top of them.

mod cell;
mod error;
pub mod frame;
mod ids;
mod messages;

pub use cell::{Cell, Piece};
pub use error::ProtocolError;
pub use ids::{ClientId, RoomId};
pub use messages::{ClientRequest, Kind, PlayerView, ServerMessage};
