//! Error types for the session layer.

use cardroom_protocol::PlayerId;

/// Errors that can occur during login.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The identity service rejected the token or couldn't be reached.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The player ID is already live on some connection, or this
    /// connection already carries a login. Carries the player that's
    /// in the way.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerId),
}
