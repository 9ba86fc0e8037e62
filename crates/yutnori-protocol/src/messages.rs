//! The message taxonomy: frame kinds and the typed request/response
//! payloads that travel inside them.
//!
//! A single enumeration of "kinds" spans both directions on the wire.
//! Several kinds are used by *both* directions with a different
//! payload shape each way (e.g. `CreateRoom` is `{name}` from the
//! client and `{room_id}` from the server) — so rather than one enum
//! per kind, we split into [`ClientRequest`] (client → server) and
//! [`ServerMessage`] (server → client), and each variant knows which
//! `Kind` ordinal it rides on.

use serde::{Deserialize, Serialize};

use crate::{Cell, ClientId, Piece, ProtocolError, RoomId};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The frame-header kind byte. Ordinals are part of the wire contract
/// — do not renumber an existing entry; append new kinds at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    Keepalive = 0,
    Connect = 1,
    Disconnect = 2,
    Quit = 3,
    CreateRoom = 4,
    ExitRoom = 5,
    SetPieceCount = 6,
    PlayerLeft = 7,
    EnterRoom = 8,
    PlayerJoined = 9,
    Ready = 10,
    KickPlayer = 11,
    StartGame = 12,
    BeginTurn = 13,
    CanRoll = 14,
    BeginRoll = 15,
    EndRoll = 16,
    EndTurn = 17,
    SelectingMove = 18,
    BeginMove = 19,
    EndMove = 20,
    EndGame = 21,
    ChangeName = 22,
}

impl Kind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Kind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Kind::Keepalive,
            1 => Kind::Connect,
            2 => Kind::Disconnect,
            3 => Kind::Quit,
            4 => Kind::CreateRoom,
            5 => Kind::ExitRoom,
            6 => Kind::SetPieceCount,
            7 => Kind::PlayerLeft,
            8 => Kind::EnterRoom,
            9 => Kind::PlayerJoined,
            10 => Kind::Ready,
            11 => Kind::KickPlayer,
            12 => Kind::StartGame,
            13 => Kind::BeginTurn,
            14 => Kind::CanRoll,
            15 => Kind::BeginRoll,
            16 => Kind::EndRoll,
            17 => Kind::EndTurn,
            18 => Kind::SelectingMove,
            19 => Kind::BeginMove,
            20 => Kind::EndMove,
            21 => Kind::EndGame,
            22 => Kind::ChangeName,
            other => {
                return Err(ProtocolError::UnknownKind(other));
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Shared payload fragments
// ---------------------------------------------------------------------------

/// A player as seen from outside the room actor — enough to rebuild
/// the lobby/game view on join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub client_id: ClientId,
    pub name: String,
    pub is_ready: bool,
    pub pieces: Vec<Piece>,
}

// ---------------------------------------------------------------------------
// ClientRequest — client → server
// ---------------------------------------------------------------------------

/// A request sent by a client. `kind()` returns the frame kind it
/// rides on; several kinds are shared with [`ServerMessage`] because
/// the same `Kind` carries a different payload shape per direction.
///
/// This enum is not itself `Serialize`/`Deserialize` — the frame kind
/// byte already identifies the variant, so wrapping the JSON payload
/// in a second variant tag would be redundant. [`crate::frame`]
/// converts between a `(Kind, payload bytes)` pair and a concrete
/// variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    CreateRoom { name: String },
    ExitRoom,
    SetPieceCount { piece_count: u8 },
    EnterRoom { room_id: RoomId, name: String },
    Ready { is_ready: bool },
    KickPlayer { player: ClientId },
    StartGame,
    BeginRoll,
    BeginMove { roll: i8, piece: u8, cell: Cell },
    EndMove { roll: i8, piece: u8, cell: Cell },
    ChangeName { name: String },
}

impl ClientRequest {
    pub fn kind(&self) -> Kind {
        match self {
            ClientRequest::CreateRoom { .. } => Kind::CreateRoom,
            ClientRequest::ExitRoom => Kind::ExitRoom,
            ClientRequest::SetPieceCount { .. } => Kind::SetPieceCount,
            ClientRequest::EnterRoom { .. } => Kind::EnterRoom,
            ClientRequest::Ready { .. } => Kind::Ready,
            ClientRequest::KickPlayer { .. } => Kind::KickPlayer,
            ClientRequest::StartGame => Kind::StartGame,
            ClientRequest::BeginRoll => Kind::BeginRoll,
            ClientRequest::BeginMove { .. } => Kind::BeginMove,
            ClientRequest::EndMove { .. } => Kind::EndMove,
            ClientRequest::ChangeName { .. } => Kind::ChangeName,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage — server → client
// ---------------------------------------------------------------------------

/// A message sent by the server, either to one client or broadcast to
/// a room's members. See the note on [`ClientRequest`] about why this
/// isn't `Serialize`/`Deserialize` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Keepalive,
    Connect { client_id: ClientId },
    Disconnect,
    CreateRoom { room_id: RoomId },
    ExitRoom { exit: bool },
    SetPieceCount { should_set: bool, piece_count: u8 },
    PlayerLeft { player: ClientId, master: Option<ClientId>, kicked: bool },
    EnterRoom {
        room_id: RoomId,
        join: bool,
        master: Option<ClientId>,
        piece_count: u8,
        players: Vec<PlayerView>,
    },
    PlayerJoined { client_id: ClientId, name: String },
    Ready { player: ClientId, is_ready: bool },
    StartGame { should_start: bool, starting_player: Option<ClientId> },
    BeginTurn,
    CanRoll { player: ClientId },
    EndRoll { should_append: bool, roll: i8 },
    EndTurn { next_player: ClientId },
    SelectingMove { player: ClientId },
    BeginMove {
        player: ClientId,
        should_move: bool,
        roll: i8,
        cell: Cell,
        piece: u8,
        finished: bool,
    },
    EndGame { winner: ClientId },
    ChangeName { player: ClientId, name: String },
}

impl ServerMessage {
    pub fn kind(&self) -> Kind {
        match self {
            ServerMessage::Keepalive => Kind::Keepalive,
            ServerMessage::Connect { .. } => Kind::Connect,
            ServerMessage::Disconnect => Kind::Disconnect,
            ServerMessage::CreateRoom { .. } => Kind::CreateRoom,
            ServerMessage::ExitRoom { .. } => Kind::ExitRoom,
            ServerMessage::SetPieceCount { .. } => Kind::SetPieceCount,
            ServerMessage::PlayerLeft { .. } => Kind::PlayerLeft,
            ServerMessage::EnterRoom { .. } => Kind::EnterRoom,
            ServerMessage::PlayerJoined { .. } => Kind::PlayerJoined,
            ServerMessage::Ready { .. } => Kind::Ready,
            ServerMessage::StartGame { .. } => Kind::StartGame,
            ServerMessage::BeginTurn => Kind::BeginTurn,
            ServerMessage::CanRoll { .. } => Kind::CanRoll,
            ServerMessage::EndRoll { .. } => Kind::EndRoll,
            ServerMessage::EndTurn { .. } => Kind::EndTurn,
            ServerMessage::SelectingMove { .. } => Kind::SelectingMove,
            ServerMessage::BeginMove { .. } => Kind::BeginMove,
            ServerMessage::EndGame { .. } => Kind::EndGame,
            ServerMessage::ChangeName { .. } => Kind::ChangeName,
        }
    }
}
