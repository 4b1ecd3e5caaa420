//! Unified error type for the Cardroom server.

use cardroom_lobby::LobbyError;
use cardroom_protocol::ProtocolError;
use cardroom_session::SessionError;
use cardroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `cardroom` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (identity lookup, duplicate login).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A lobby-level error (membership, host privileges).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
