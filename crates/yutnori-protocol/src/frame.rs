//! Wire framing: `[kind: u8][payload_len: u16 BE][payload: JSON bytes]`.
//!
//! There's no magic number and no checksum — TCP already guarantees
//! byte-exact, in-order delivery, so a framing layer only needs to
//! mark where one message ends and the next begins. The actual
//! socket I/O (reading exactly `payload_len` bytes, retrying on
//! transient timeouts) lives in `yutnori-transport`; this module only
//! does the pure byte math and the payload <-> message conversion.

use serde_json::{json, Value};

use crate::{ClientRequest, Kind, ProtocolError, ServerMessage};

/// Size of the fixed frame header in bytes: one kind byte, two
/// big-endian length bytes.
pub const HEADER_LEN: usize = 3;

/// The largest payload a single frame can carry — `u16::MAX`, since
/// the length field is 16 bits.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// A parsed frame header: which kind of message follows, and how many
/// payload bytes to read next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: Kind,
    pub payload_len: u16,
}

/// Parses the fixed 3-byte header preceding every frame's payload.
pub fn parse_header(bytes: [u8; HEADER_LEN]) -> Result<FrameHeader, ProtocolError> {
    let kind = Kind::try_from(bytes[0])?;
    let payload_len = u16::from_be_bytes([bytes[1], bytes[2]]);
    Ok(FrameHeader { kind, payload_len })
}

/// Builds the 3-byte header for a frame carrying `payload_len` bytes.
pub fn encode_header(kind: Kind, payload_len: usize) -> Result<[u8; HEADER_LEN], ProtocolError> {
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge(payload_len));
    }
    let len_bytes = (payload_len as u16).to_be_bytes();
    Ok([kind.as_u8(), len_bytes[0], len_bytes[1]])
}

/// Encodes a full frame (header + payload) for a client request.
pub fn encode_request(request: &ClientRequest) -> Result<Vec<u8>, ProtocolError> {
    encode_frame(request.kind(), request_payload(request))
}

/// Encodes a full frame (header + payload) for a server message.
pub fn encode_message(message: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    encode_frame(message.kind(), message_payload(message))
}

fn encode_frame(kind: Kind, payload: Value) -> Result<Vec<u8>, ProtocolError> {
    let body = if payload.is_null() {
        Vec::new()
    } else {
        serde_json::to_vec(&payload).map_err(ProtocolError::Encode)?
    };
    let header = encode_header(kind, body.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes a client request from a frame's kind and payload bytes.
pub fn decode_request(kind: Kind, payload: &[u8]) -> Result<ClientRequest, ProtocolError> {
    let value = parse_payload(payload)?;
    Ok(match kind {
        Kind::CreateRoom => ClientRequest::CreateRoom { name: field(&value, "name")? },
        Kind::ExitRoom => ClientRequest::ExitRoom,
        Kind::SetPieceCount => ClientRequest::SetPieceCount {
            piece_count: field(&value, "piece_count")?,
        },
        Kind::EnterRoom => ClientRequest::EnterRoom {
            room_id: field(&value, "room_id")?,
            name: field(&value, "name")?,
        },
        Kind::Ready => ClientRequest::Ready { is_ready: field(&value, "is_ready")? },
        Kind::KickPlayer => ClientRequest::KickPlayer { player: field(&value, "player")? },
        Kind::StartGame => ClientRequest::StartGame,
        Kind::BeginRoll => ClientRequest::BeginRoll,
        Kind::BeginMove => ClientRequest::BeginMove {
            roll: field(&value, "roll")?,
            piece: field(&value, "piece")?,
            cell: field(&value, "cell")?,
        },
        Kind::EndMove => ClientRequest::EndMove {
            roll: field(&value, "roll")?,
            piece: field(&value, "piece")?,
            cell: field(&value, "cell")?,
        },
        Kind::ChangeName => ClientRequest::ChangeName { name: field(&value, "name")? },
        other => return Err(ProtocolError::UnknownKind(other.as_u8())),
    })
}

/// Decodes a server message from a frame's kind and payload bytes.
pub fn decode_message(kind: Kind, payload: &[u8]) -> Result<ServerMessage, ProtocolError> {
    let value = parse_payload(payload)?;
    Ok(match kind {
        Kind::Keepalive => ServerMessage::Keepalive,
        Kind::Connect => ServerMessage::Connect { client_id: field(&value, "client_id")? },
        Kind::Disconnect => ServerMessage::Disconnect,
        Kind::CreateRoom => ServerMessage::CreateRoom { room_id: field(&value, "room_id")? },
        Kind::ExitRoom => ServerMessage::ExitRoom { exit: field(&value, "exit")? },
        Kind::SetPieceCount => ServerMessage::SetPieceCount {
            should_set: field(&value, "should_set")?,
            piece_count: field(&value, "piece_count")?,
        },
        Kind::PlayerLeft => ServerMessage::PlayerLeft {
            player: field(&value, "player")?,
            master: optional_field(&value, "master")?,
            kicked: field(&value, "kicked")?,
        },
        Kind::EnterRoom => ServerMessage::EnterRoom {
            room_id: field(&value, "room_id")?,
            join: field(&value, "join")?,
            master: optional_field(&value, "master")?,
            piece_count: field(&value, "piece_count")?,
            players: field(&value, "players")?,
        },
        Kind::PlayerJoined => ServerMessage::PlayerJoined {
            client_id: field(&value, "client_id")?,
            name: field(&value, "name")?,
        },
        Kind::Ready => ServerMessage::Ready {
            player: field(&value, "player")?,
            is_ready: field(&value, "is_ready")?,
        },
        Kind::StartGame => ServerMessage::StartGame {
            should_start: field(&value, "should_start")?,
            starting_player: optional_field(&value, "starting_player")?,
        },
        Kind::BeginTurn => ServerMessage::BeginTurn,
        Kind::CanRoll => ServerMessage::CanRoll { player: field(&value, "player")? },
        Kind::EndRoll => ServerMessage::EndRoll {
            should_append: field(&value, "should_append")?,
            roll: field(&value, "roll")?,
        },
        Kind::EndTurn => ServerMessage::EndTurn { next_player: field(&value, "next_player")? },
        Kind::SelectingMove => ServerMessage::SelectingMove { player: field(&value, "player")? },
        Kind::BeginMove => ServerMessage::BeginMove {
            player: field(&value, "player")?,
            should_move: field(&value, "should_move")?,
            roll: field(&value, "roll")?,
            cell: field(&value, "cell")?,
            piece: field(&value, "piece")?,
            finished: field(&value, "finished")?,
        },
        Kind::EndGame => ServerMessage::EndGame { winner: field(&value, "winner")? },
        Kind::ChangeName => ServerMessage::ChangeName {
            player: field(&value, "player")?,
            name: field(&value, "name")?,
        },
        other => return Err(ProtocolError::UnknownKind(other.as_u8())),
    })
}

fn request_payload(request: &ClientRequest) -> Value {
    match request {
        ClientRequest::CreateRoom { name } => json!({ "name": name }),
        ClientRequest::ExitRoom => Value::Null,
        ClientRequest::SetPieceCount { piece_count } => json!({ "piece_count": piece_count }),
        ClientRequest::EnterRoom { room_id, name } => {
            json!({ "room_id": room_id, "name": name })
        }
        ClientRequest::Ready { is_ready } => json!({ "is_ready": is_ready }),
        ClientRequest::KickPlayer { player } => json!({ "player": player }),
        ClientRequest::StartGame => Value::Null,
        ClientRequest::BeginRoll => Value::Null,
        ClientRequest::BeginMove { roll, piece, cell } => {
            json!({ "roll": roll, "piece": piece, "cell": cell })
        }
        ClientRequest::EndMove { roll, piece, cell } => {
            json!({ "roll": roll, "piece": piece, "cell": cell })
        }
        ClientRequest::ChangeName { name } => json!({ "name": name }),
    }
}

fn message_payload(message: &ServerMessage) -> Value {
    match message {
        ServerMessage::Keepalive => Value::Null,
        ServerMessage::Connect { client_id } => json!({ "client_id": client_id }),
        ServerMessage::Disconnect => Value::Null,
        ServerMessage::CreateRoom { room_id } => json!({ "room_id": room_id }),
        ServerMessage::ExitRoom { exit } => json!({ "exit": exit }),
        ServerMessage::SetPieceCount { should_set, piece_count } => {
            json!({ "should_set": should_set, "piece_count": piece_count })
        }
        ServerMessage::PlayerLeft { player, master, kicked } => {
            json!({ "player": player, "master": master, "kicked": kicked })
        }
        ServerMessage::EnterRoom { room_id, join, master, piece_count, players } => {
            json!({
                "room_id": room_id,
                "join": join,
                "master": master,
                "piece_count": piece_count,
                "players": players,
            })
        }
        ServerMessage::PlayerJoined { client_id, name } => {
            json!({ "client_id": client_id, "name": name })
        }
        ServerMessage::Ready { player, is_ready } => {
            json!({ "player": player, "is_ready": is_ready })
        }
        ServerMessage::StartGame { should_start, starting_player } => {
            json!({ "should_start": should_start, "starting_player": starting_player })
        }
        ServerMessage::BeginTurn => Value::Null,
        ServerMessage::CanRoll { player } => json!({ "player": player }),
        ServerMessage::EndRoll { should_append, roll } => {
            json!({ "should_append": should_append, "roll": roll })
        }
        ServerMessage::EndTurn { next_player } => json!({ "next_player": next_player }),
        ServerMessage::SelectingMove { player } => json!({ "player": player }),
        ServerMessage::BeginMove { player, should_move, roll, cell, piece, finished } => {
            json!({
                "player": player,
                "should_move": should_move,
                "roll": roll,
                "cell": cell,
                "piece": piece,
                "finished": finished,
            })
        }
        ServerMessage::EndGame { winner } => json!({ "winner": winner }),
        ServerMessage::ChangeName { player, name } => {
            json!({ "player": player, "name": name })
        }
    }
}

fn parse_payload(payload: &[u8]) -> Result<Value, ProtocolError> {
    if payload.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(payload).map_err(ProtocolError::Decode)
}

fn field<T: serde::de::DeserializeOwned>(value: &Value, name: &str) -> Result<T, ProtocolError> {
    let raw = value.get(name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(raw).map_err(ProtocolError::Decode)
}

fn optional_field<T: serde::de::DeserializeOwned>(
    value: &Value,
    name: &str,
) -> Result<Option<T>, ProtocolError> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => Ok(Some(
            serde_json::from_value(raw.clone()).map_err(ProtocolError::Decode)?,
        )),
    }
}
