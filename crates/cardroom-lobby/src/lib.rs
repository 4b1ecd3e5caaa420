//! Lobby management for Cardroom.
//!
//! Lobbies are named player groups with a host. This crate is pure
//! state — entities and a registry, no I/O — so the server layer above
//! decides when to lock it and who to notify.
//!
//! # Key types
//!
//! - [`Lobby`] — one lobby: name, host, ordered member set
//! - [`LobbyRegistry`] — creates/dissolves lobbies, resolves lookups,
//!   enforces one-lobby-per-player
//! - [`DepartureNotice`] — what a removal hands back so callers can
//!   notify the remaining members

mod error;
mod lobby;
mod registry;

pub use error::LobbyError;
pub use lobby::Lobby;
pub use registry::{DepartureNotice, LobbyRegistry};
