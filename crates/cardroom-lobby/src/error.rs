//! Error types for the lobby layer.
//!
//! The `Display` strings here double as the error messages clients see
//! on the wire, so they are part of the protocol contract — change them
//! and existing clients stop matching. Variant fields exist for the
//! server's own structured logs.

use cardroom_protocol::{LobbyId, PlayerId};

/// Errors that can occur during lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// Neither the ID nor the name lookup found a lobby.
    #[error("no such lobby found")]
    NoSuchLobby,

    /// The player isn't in the lobby the operation needs them in.
    #[error("player is not in a lobby")]
    NotInLobby(PlayerId),

    /// The player is already in a lobby and can't create or join
    /// another until they leave it.
    #[error("player is already in a lobby")]
    AlreadyInLobby {
        /// Who tried to create or join.
        player: PlayerId,
        /// The lobby they're already in.
        lobby: LobbyId,
    },

    /// A kick from someone who doesn't host the lobby.
    #[error("insufficient privileges; must be lobby host to kick users")]
    NotHost {
        /// Who tried to kick.
        player: PlayerId,
        /// The lobby they tried to kick from.
        lobby: LobbyId,
    },
}
