//! Core protocol types for Cardroom's wire format.
//!
//! This module defines every type that travels "on the wire" — meaning these
//! are the structures that get serialized to bytes, sent over the network,
//! and deserialized on the other side.
//!
//! Think of this as the "language" that the client and server speak:
//! clients only ever send [`Request`]s, the server only ever sends
//! [`Response`]s.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The protocol version spoken by this build.
///
/// The first packet on every connection must be `Request::Version` carrying
/// exactly this number. There are no compatibility ranges: any other value
/// is rejected and the connection closed.
pub const PROTOCOL_VERSION: u32 = 1;

/// The archive pile, addressable through [`Request::CardPile`].
pub const CARD_PILE_ARCHIVE: u8 = 0;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// This is a newtype wrapper around the ID string issued by the identity
/// service. Wrapping it means you can't accidentally pass a display name
/// where an ID is expected, even though both are strings underneath.
///
/// The `#[serde(transparent)]` attribute tells serde to serialize this as
/// just the inner string, not as `{ "0": "..." }`. So a
/// `PlayerId("ab12")` becomes just `"ab12"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the raw ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display prints the raw ID, so `tracing::info!(%player_id, ...)` logs
/// the same string the identity service issued.
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A unique identifier for a lobby.
///
/// Same newtype pattern as [`PlayerId`], but lobby IDs are minted by this
/// server (a process-wide counter), so the inner type is a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub u64);

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// List entries
// ---------------------------------------------------------------------------

/// One row of a [`Response::PlayerList`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    /// The player's unique ID.
    pub id: PlayerId,
    /// The player's display name.
    pub name: String,
}

/// One row of a [`Response::LobbyList`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    /// The lobby's unique ID.
    pub id: LobbyId,
    /// The lobby's display name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Request — everything a client can send
// ---------------------------------------------------------------------------

/// Messages sent by clients.
///
/// `#[serde(tag = "type")]` is a serde attribute that controls how this enum
/// is represented in JSON. Instead of:
///   `{ "Version": { "version": 1 } }`
/// it produces:
///   `{ "type": "Version", "version": 1 }`
/// This "internally tagged" format means one decode step classifies the
/// packet and parses its payload at the same time: a known tag with a
/// malformed payload fails right here, before any handler runs, and an
/// unknown tag lands in the [`Request::Unknown`] arm instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Client → Server: "I speak protocol version N."
    ///
    /// Must be the first packet on a connection. Anything other than
    /// [`PROTOCOL_VERSION`] gets an error response and the connection
    /// is closed.
    Version { version: u32 },

    /// Client → Server: "This is who I am."
    ///
    /// `token` is presented to the identity service; the profile it
    /// returns must carry exactly `id`, or the login is rejected.
    Login {
        name: String,
        id: PlayerId,
        token: String,
    },

    /// Client → Server: "I'm leaving."
    Exit,

    /// Client → Server: "Create a lobby named `name` with me as host."
    CreateLobby { name: String },

    /// Client → Server: "Who is online?"
    PlayerList,

    /// Client → Server: a chat line for every connected player.
    GlobalChat { message: String },

    /// Client → Server: a chat line for the sender's lobby.
    ///
    /// Accepted but not yet delivered anywhere.
    LobbyChat { message: String },

    /// Client → Server: "What lobbies exist?"
    LobbyList,

    /// Client → Server: "Put me in this lobby."
    ///
    /// Resolved by `id` when present, by `name` scan otherwise.
    JoinLobby {
        #[serde(default)]
        id: Option<LobbyId>,
        name: String,
    },

    /// Client → Server: "Take me out of this lobby."
    ///
    /// Same `id`-then-`name` resolution as [`Request::JoinLobby`].
    LeaveLobby {
        #[serde(default)]
        id: Option<LobbyId>,
        name: String,
    },

    /// Client → Server: "Remove `target` from my lobby."
    ///
    /// Only honored when the sender hosts the lobby.
    LobbyKick { target: PlayerId },

    /// Client → Server: "Show me a card pile."
    ///
    /// Recognized and ignored server-side; see [`CARD_PILE_ARCHIVE`].
    CardPile { pile: u8 },

    /// Catch-all for tags this build doesn't know.
    ///
    /// `#[serde(other)]` routes any unrecognized `"type"` value here, so
    /// newer or junk packet types decode cleanly and the dispatcher can
    /// drop them without tearing the connection down.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Response — everything the server can send
// ---------------------------------------------------------------------------

/// Messages sent by the server, in the same internally tagged format
/// as [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Server → Client: "Something went wrong."
    ///
    /// The message is a stable, human-readable sentence; clients match on
    /// it, so the exact strings are part of the protocol.
    Error { message: String },

    /// Server → Client: "Your lobby exists now."
    CreateLobby { lobby_id: LobbyId },

    /// Server → Client: snapshot of every connected player.
    PlayerList {
        count: u32,
        players: Vec<PlayerEntry>,
    },

    /// Server → Client: one global chat line.
    GlobalChat { sender: String, message: String },

    /// Server → Client: snapshot of every open lobby.
    LobbyList {
        count: u32,
        lobbies: Vec<LobbyEntry>,
    },

    /// Server → Client: "Someone joined your lobby" (also echoed to the
    /// joiner themselves).
    JoinLobby {
        name: String,
        lobby_id: LobbyId,
        success: bool,
    },

    /// Server → Client: "Someone left your lobby."
    LeaveLobby {
        name: String,
        lobby_id: LobbyId,
        success: bool,
    },

    /// Server → Client: kick notification, sent to the kicker and the
    /// kicked player.
    LobbyKick { target: PlayerId, success: bool },
}

// =========================================================================
// Tests
// =========================================================================
