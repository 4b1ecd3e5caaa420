//! The player registry: tracks every logged-in player.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Recording a player at login, keyed by their connection
//! - Looking players up by connection (the hot path: every request
//!   resolves its sender this way) or by player ID (kick targets)
//! - Enforcing one login per connection and one connection per player ID
//! - Handing out insertion-ordered snapshots for lists and broadcasts
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is NOT thread-safe by itself — it uses plain
//! `HashMap`s, not concurrent ones. This is intentional: the server
//! wraps it in a `RwLock` at a higher level, and handlers take the
//! guard for as little as a lookup or a snapshot. Keeping it simple
//! here avoids hidden locking overhead.

use std::collections::HashMap;
use std::sync::Arc;

use cardroom_protocol::PlayerId;
use cardroom_transport::{Connection, ConnectionId};

use crate::{Player, SessionError};

/// All logged-in players, indexed by connection and by player ID.
///
/// The two maps and the order list are kept in sync on every insert and
/// remove:
///
/// ```text
/// by_conn:  ConnectionId → Arc<Player>     (owning map)
/// by_id:    PlayerId     → ConnectionId    (kick targets, dup logins)
/// order:    [ConnectionId]                 (insertion order for snapshots)
/// ```
#[derive(Default)]
pub struct PlayerRegistry {
    by_conn: HashMap<ConnectionId, Arc<Player>>,
    by_id: HashMap<PlayerId, ConnectionId>,
    order: Vec<ConnectionId>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly logged-in player, keyed by their connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the player's ID is
    /// already live on another connection, or if this connection already
    /// carries a login. The error names the player that's in the way, so
    /// the caller can log who blocked the login.
    pub fn insert(&mut self, player: Arc<Player>) -> Result<(), SessionError> {
        let conn_id = player.conn.id();

        if self.by_id.contains_key(&player.id) {
            return Err(SessionError::AlreadyConnected(player.id.clone()));
        }
        if let Some(existing) = self.by_conn.get(&conn_id) {
            return Err(SessionError::AlreadyConnected(existing.id.clone()));
        }

        tracing::debug!(player_id = %player.id, %conn_id, "player registered");

        self.by_id.insert(player.id.clone(), conn_id);
        self.by_conn.insert(conn_id, player);
        self.order.push(conn_id);
        Ok(())
    }

    /// Looks up the player bound to a connection.
    ///
    /// Returns `None` for connections that never logged in (or already
    /// left).
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<Player>> {
        self.by_conn.get(&conn_id).cloned()
    }

    /// Looks up a player by their ID.
    pub fn get_by_id(&self, id: &PlayerId) -> Option<Arc<Player>> {
        let conn_id = self.by_id.get(id)?;
        self.by_conn.get(conn_id).cloned()
    }

    /// Removes the player bound to a connection, freeing both their ID
    /// and the connection slot.
    ///
    /// Returns the removed player so the caller can finish cleanup
    /// (lobby membership, notifications). Returns `None` if the
    /// connection carried no login.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<Arc<Player>> {
        let player = self.by_conn.remove(&conn_id)?;
        self.by_id.remove(&player.id);
        self.order.retain(|c| *c != conn_id);

        tracing::debug!(player_id = %player.id, %conn_id, "player deregistered");
        Some(player)
    }

    /// Returns every player in login order.
    ///
    /// This is the snapshot handlers take under the read lock before
    /// doing any network I/O: the `Arc`s keep the players alive after
    /// the guard is dropped.
    pub fn players(&self) -> Vec<Arc<Player>> {
        self.order
            .iter()
            .filter_map(|conn_id| self.by_conn.get(conn_id).cloned())
            .collect()
    }

    /// Returns the number of logged-in players.
    pub fn len(&self) -> usize {
        self.by_conn.len()
    }

    /// Returns `true` if nobody is logged in.
    pub fn is_empty(&self) -> bool {
        self.by_conn.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
