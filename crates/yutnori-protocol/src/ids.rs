//! Identity types for clients and rooms.
//!
//! Both identities use the same scheme: 20 random bytes, Crockford
//! base32-encoded with no padding. 20 bytes is 160 bits of entropy,
//! which base32-encodes to exactly 32 ASCII characters (`ceil(160/5)`)
//! with nothing left over to pad. Collisions are vanishingly
//! improbable; we don't check for them here, the hub does (it's the
//! only place that can see the whole id space at once).

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

const ID_BYTES: usize = 20;

fn random_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base32::encode(base32::Alphabet::Crockford, &bytes)
}

/// A client's opaque identity, assigned on accept and held for the
/// lifetime of the connection.
///
/// `#[serde(transparent)]` means `ClientId("...")` serializes as the
/// bare string, not as `{"0": "..."}` — the wire format for e.g.
/// `Connect { client_id }` is just a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Generates a fresh, random client id.
    pub fn generate() -> Self {
        Self(random_id())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A room's opaque identity, minted when the room is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Generates a fresh, random room id.
    pub fn generate() -> Self {
        Self(random_id())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
