//! The `Lobby` entity: a named group of players with a host.
//!
//! A lobby is pure state — who's in it and who runs it. All networking
//! (join broadcasts, kick notices) happens in the layer above; keeping
//! I/O out of here means every rule about membership and host succession
//! is testable without a socket in sight.

use cardroom_protocol::{LobbyEntry, LobbyId, PlayerId};

/// What happened when a member was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Removal {
    /// An ordinary member left; host and lobby unaffected.
    Member,
    /// The host left; the oldest remaining member was promoted.
    HostPromoted(PlayerId),
    /// The last member left. The registry dissolves the lobby when
    /// this comes back.
    Emptied,
}

/// A named group of players.
///
/// `members` is an ordered set: insertion order is preserved (it drives
/// broadcast order and host succession) and duplicates are rejected.
/// Invariant: the host is always a member.
#[derive(Debug, Clone)]
pub struct Lobby {
    /// The lobby's unique ID, minted by the registry.
    pub id: LobbyId,
    /// Display name; join requests may resolve lobbies by it.
    pub name: String,
    host: PlayerId,
    members: Vec<PlayerId>,
}

impl Lobby {
    /// Creates a lobby with the given host as its sole member.
    pub(crate) fn new(id: LobbyId, name: &str, host: PlayerId) -> Self {
        Self {
            id,
            name: name.to_string(),
            members: vec![host.clone()],
            host,
        }
    }

    /// Returns the current host.
    pub fn host(&self) -> &PlayerId {
        &self.host
    }

    /// Returns the members in join order. The host is always present.
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    /// Returns `true` if the player is in this lobby.
    pub fn is_member(&self, player: &PlayerId) -> bool {
        self.members.iter().any(|m| m == player)
    }

    /// Returns `true` if the player hosts this lobby.
    pub fn is_host(&self, player: &PlayerId) -> bool {
        self.host == *player
    }

    /// Adds a member at the end of the join order.
    ///
    /// Returns `false` (and changes nothing) if they're already in.
    pub(crate) fn add_member(&mut self, player: PlayerId) -> bool {
        if self.is_member(&player) {
            return false;
        }
        self.members.push(player);
        true
    }

    /// Removes a member, promoting a new host if the host departed.
    ///
    /// Returns `None` (and changes nothing) if the player wasn't a
    /// member.
    pub(crate) fn remove_member(
        &mut self,
        player: &PlayerId,
    ) -> Option<Removal> {
        let pos = self.members.iter().position(|m| m == player)?;
        self.members.remove(pos);

        if self.members.is_empty() {
            return Some(Removal::Emptied);
        }
        if self.host == *player {
            // Succession by seniority: the member who joined earliest.
            self.host = self.members[0].clone();
            return Some(Removal::HostPromoted(self.host.clone()));
        }
        Some(Removal::Member)
    }

    /// Returns this lobby's row for a lobby-list snapshot.
    pub fn entry(&self) -> LobbyEntry {
        LobbyEntry {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the lobby has no members.
    ///
    /// Only ever observable mid-removal; the registry dissolves emptied
    /// lobbies before handing them out.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    fn lobby() -> Lobby {
        Lobby::new(LobbyId(1), "casual", pid("host"))
    }

    #[test]
    fn test_new_lobby_host_is_sole_member() {
        let lobby = lobby();

        assert_eq!(lobby.host(), &pid("host"));
        assert_eq!(lobby.members(), &[pid("host")]);
        assert!(lobby.is_member(&pid("host")));
        assert!(lobby.is_host(&pid("host")));
    }

    #[test]
    fn test_add_member_appends_in_join_order() {
        let mut lobby = lobby();

        assert!(lobby.add_member(pid("a")));
        assert!(lobby.add_member(pid("b")));

        assert_eq!(lobby.members(), &[pid("host"), pid("a"), pid("b")]);
    }

    #[test]
    fn test_add_member_duplicate_is_rejected() {
        let mut lobby = lobby();
        lobby.add_member(pid("a"));

        assert!(!lobby.add_member(pid("a")), "duplicate should be rejected");
        assert_eq!(lobby.len(), 2, "member list should be unchanged");
    }

    #[test]
    fn test_remove_member_ordinary_member_keeps_host() {
        let mut lobby = lobby();
        lobby.add_member(pid("a"));

        let removal = lobby.remove_member(&pid("a"));

        assert_eq!(removal, Some(Removal::Member));
        assert_eq!(lobby.host(), &pid("host"));
        assert_eq!(lobby.members(), &[pid("host")]);
    }

    #[test]
    fn test_remove_member_host_promotes_oldest_remaining() {
        let mut lobby = lobby();
        lobby.add_member(pid("a"));
        lobby.add_member(pid("b"));

        let removal = lobby.remove_member(&pid("host"));

        // "a" joined before "b", so "a" inherits the lobby.
        assert_eq!(removal, Some(Removal::HostPromoted(pid("a"))));
        assert_eq!(lobby.host(), &pid("a"));
        assert!(lobby.is_host(&pid("a")));
        assert_eq!(lobby.members(), &[pid("a"), pid("b")]);
    }

    #[test]
    fn test_remove_member_last_member_reports_emptied() {
        let mut lobby = lobby();

        let removal = lobby.remove_member(&pid("host"));

        assert_eq!(removal, Some(Removal::Emptied));
        assert!(lobby.is_empty());
    }

    #[test]
    fn test_remove_member_non_member_returns_none() {
        let mut lobby = lobby();

        assert_eq!(lobby.remove_member(&pid("stranger")), None);
        assert_eq!(lobby.len(), 1, "member list should be unchanged");
    }

    #[test]
    fn test_entry_snapshots_id_and_name() {
        let lobby = lobby();

        let entry = lobby.entry();

        assert_eq!(entry.id, LobbyId(1));
        assert_eq!(entry.name, "casual");
    }
}
