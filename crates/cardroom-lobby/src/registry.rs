//! Lobby registry: creates, tracks, and dissolves lobbies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cardroom_protocol::{LobbyEntry, LobbyId, PlayerId};

use crate::lobby::Removal;
use crate::{Lobby, LobbyError};

/// Counter for generating unique lobby IDs.
static NEXT_LOBBY_ID: AtomicU64 = AtomicU64::new(1);

/// Everything the caller needs to announce a departure.
///
/// Returned by the removal paths (leave, kick, disconnect cleanup) so
/// the layer above can notify `remaining` without re-locking the
/// registry. `remaining` is empty when the lobby dissolved.
#[derive(Debug, Clone)]
pub struct DepartureNotice {
    /// The lobby the player left.
    pub lobby_id: LobbyId,
    /// Its display name, for the notification packet.
    pub lobby_name: String,
    /// Members still in the lobby, in join order.
    pub remaining: Vec<PlayerId>,
}

/// Manages all open lobbies and tracks which player is in which lobby.
///
/// This is the entry point for lobby operations from the server layer.
/// Like the player registry, it's plain maps under a server-level lock:
///
/// ```text
/// lobbies:     LobbyId  → Lobby      (owning map)
/// order:       [LobbyId]             (insertion order for listings)
/// membership:  PlayerId → LobbyId    (the one-lobby-at-a-time index)
/// ```
#[derive(Default)]
pub struct LobbyRegistry {
    lobbies: HashMap<LobbyId, Lobby>,
    order: Vec<LobbyId>,
    membership: HashMap<PlayerId, LobbyId>,
}

impl LobbyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new lobby with `host` as its sole member and returns
    /// the minted ID.
    ///
    /// # Errors
    /// Returns [`LobbyError::AlreadyInLobby`] if the host is in a lobby
    /// already; players are in at most one lobby at a time.
    pub fn create(
        &mut self,
        name: &str,
        host: PlayerId,
    ) -> Result<LobbyId, LobbyError> {
        if let Some(current) = self.membership.get(&host) {
            return Err(LobbyError::AlreadyInLobby {
                player: host,
                lobby: *current,
            });
        }

        let lobby_id = LobbyId(NEXT_LOBBY_ID.fetch_add(1, Ordering::Relaxed));
        let lobby = Lobby::new(lobby_id, name, host.clone());

        self.membership.insert(host, lobby_id);
        self.lobbies.insert(lobby_id, lobby);
        self.order.push(lobby_id);

        tracing::info!(%lobby_id, name, "lobby created");
        Ok(lobby_id)
    }

    /// Looks up a lobby by ID.
    pub fn get(&self, lobby_id: LobbyId) -> Option<&Lobby> {
        self.lobbies.get(&lobby_id)
    }

    /// Scans for a lobby by display name, oldest first.
    ///
    /// Names aren't unique; the earliest-created match wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Lobby> {
        self.order
            .iter()
            .filter_map(|id| self.lobbies.get(id))
            .find(|lobby| lobby.name == name)
    }

    /// Resolves a join/leave request to a lobby ID: by ID when one is
    /// given and still valid, by name scan otherwise.
    ///
    /// A stale ID with a resolvable name silently falls back to the
    /// name lookup.
    ///
    /// # Errors
    /// Returns [`LobbyError::NoSuchLobby`] when neither lookup lands.
    pub fn resolve(
        &self,
        id: Option<LobbyId>,
        name: &str,
    ) -> Result<LobbyId, LobbyError> {
        if let Some(id) = id {
            if self.lobbies.contains_key(&id) {
                return Ok(id);
            }
        }
        self.find_by_name(name)
            .map(|lobby| lobby.id)
            .ok_or(LobbyError::NoSuchLobby)
    }

    /// Adds a player to a lobby.
    ///
    /// Re-joining the lobby you're already in is a no-op; the member
    /// set never picks up duplicates.
    ///
    /// # Errors
    /// - [`LobbyError::AlreadyInLobby`] — the player is in a different
    ///   lobby; they must leave it first.
    /// - [`LobbyError::NoSuchLobby`] — the lobby ID is stale.
    pub fn join(
        &mut self,
        lobby_id: LobbyId,
        player: PlayerId,
    ) -> Result<(), LobbyError> {
        match self.membership.get(&player) {
            Some(current) if *current == lobby_id => return Ok(()),
            Some(current) => {
                return Err(LobbyError::AlreadyInLobby {
                    player,
                    lobby: *current,
                });
            }
            None => {}
        }

        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or(LobbyError::NoSuchLobby)?;
        lobby.add_member(player.clone());

        tracing::debug!(%lobby_id, player_id = %player, "player joined lobby");
        self.membership.insert(player, lobby_id);
        Ok(())
    }

    /// Removes a player from a lobby, applying host succession and
    /// dissolving the lobby if it empties.
    ///
    /// # Errors
    /// - [`LobbyError::NoSuchLobby`] — the lobby ID is stale.
    /// - [`LobbyError::NotInLobby`] — the player isn't a member.
    pub fn remove_from(
        &mut self,
        lobby_id: LobbyId,
        player: &PlayerId,
    ) -> Result<DepartureNotice, LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or(LobbyError::NoSuchLobby)?;

        let removal = lobby
            .remove_member(player)
            .ok_or_else(|| LobbyError::NotInLobby(player.clone()))?;

        let notice = DepartureNotice {
            lobby_id,
            lobby_name: lobby.name.clone(),
            remaining: lobby.members().to_vec(),
        };
        self.membership.remove(player);

        match removal {
            Removal::Member => {}
            Removal::HostPromoted(new_host) => {
                tracing::info!(%lobby_id, %new_host, "lobby host changed");
            }
            Removal::Emptied => {
                self.lobbies.remove(&lobby_id);
                self.order.retain(|id| *id != lobby_id);
                tracing::info!(%lobby_id, "lobby dissolved");
            }
        }

        Ok(notice)
    }

    /// Removes a player from whatever lobby they're in, if any.
    ///
    /// This is the disconnect-cleanup entry point: unlike
    /// [`remove_from`](Self::remove_from), it doesn't care whether the
    /// player was in a lobby at all.
    pub fn remove_player(
        &mut self,
        player: &PlayerId,
    ) -> Option<DepartureNotice> {
        let lobby_id = *self.membership.get(player)?;
        self.remove_from(lobby_id, player).ok()
    }

    /// Removes `target` from the lobby `requester` hosts.
    ///
    /// Hosts can kick themselves; that's just a host departure, with
    /// the usual succession.
    ///
    /// # Errors
    /// - [`LobbyError::NotInLobby`] — the requester has no lobby, or
    ///   the target isn't in it.
    /// - [`LobbyError::NotHost`] — the requester isn't the host.
    pub fn kick(
        &mut self,
        requester: &PlayerId,
        target: &PlayerId,
    ) -> Result<DepartureNotice, LobbyError> {
        let lobby_id = *self
            .membership
            .get(requester)
            .ok_or_else(|| LobbyError::NotInLobby(requester.clone()))?;

        let lobby = self
            .lobbies
            .get(&lobby_id)
            .expect("membership points at a live lobby");
        if !lobby.is_host(requester) {
            return Err(LobbyError::NotHost {
                player: requester.clone(),
                lobby: lobby_id,
            });
        }
        if !lobby.is_member(target) {
            return Err(LobbyError::NotInLobby(target.clone()));
        }

        self.remove_from(lobby_id, target)
    }

    /// Returns the lobby a player is currently in, if any.
    pub fn lobby_of(&self, player: &PlayerId) -> Option<LobbyId> {
        self.membership.get(player).copied()
    }

    /// Returns the members of a lobby in join order.
    pub fn members(&self, lobby_id: LobbyId) -> Option<Vec<PlayerId>> {
        self.lobbies
            .get(&lobby_id)
            .map(|lobby| lobby.members().to_vec())
    }

    /// Returns every open lobby's listing row, oldest first.
    ///
    /// This is the snapshot the lobby-list handler takes under the read
    /// lock before doing any network I/O.
    pub fn entries(&self) -> Vec<LobbyEntry> {
        self.order
            .iter()
            .filter_map(|id| self.lobbies.get(id))
            .map(Lobby::entry)
            .collect()
    }

    /// Returns the number of open lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Returns `true` if no lobbies are open.
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }
}
