//! The `Player` entity: the server's record of one logged-in client.
//!
//! A player is created during login (after the identity service vouches
//! for the claimed ID) and lives in the [`PlayerRegistry`](crate::PlayerRegistry)
//! until their connection goes away. It couples three things:
//!
//! - WHO the player is (`id`, display `name`)
//! - HOW to reach them (the shared connection handle)
//! - a per-connection response counter (`sequence`)

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cardroom_protocol::{PlayerEntry, PlayerId};
use cardroom_transport::TcpConnection;

/// One logged-in player.
///
/// Shared as `Arc<Player>` between the owning connection task and anyone
/// broadcasting to it. `id` and `name` are fixed at login (a second login
/// for a live ID is rejected, never merged), and the connection's write
/// half carries its own lock, so the player itself needs no outer lock —
/// only the `sequence` counter is mutable, and it's atomic.
pub struct Player {
    /// The identity-service-issued ID.
    pub id: PlayerId,

    /// Display name, as claimed in the login request.
    pub name: String,

    /// The framed connection to this player's client. Concurrent
    /// broadcasters serialize per recipient on the write half's lock.
    pub conn: Arc<TcpConnection>,

    /// Count of responses sent to this player. Bumped once per send.
    sequence: AtomicU64,
}

impl Player {
    /// Creates a player record for a freshly authenticated login.
    pub fn new(id: PlayerId, name: &str, conn: Arc<TcpConnection>) -> Self {
        Self {
            id,
            name: name.to_string(),
            conn,
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns this player's row for a player-list snapshot.
    pub fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Increments the response counter and returns the new value.
    pub fn bump_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// =========================================================================
// Tests
// =========================================================================
