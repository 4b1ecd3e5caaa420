//! Player identity and session tracking for Cardroom.
//!
//! This crate handles who is on the other end of each connection:
//!
//! 1. **Identity** — resolving login tokens through an external service
//!    ([`IdentityService`] trait, [`StaticProfiles`] for development)
//! 2. **Players** — the per-connection [`Player`] record created at login
//! 3. **The registry** — knowing who's connected ([`PlayerRegistry`]),
//!    indexed by connection and by player ID
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby Layer (above)  ← groups players; stores only their IDs
//!     ↕
//! Session Layer (this crate)  ← owns the players, maps connections to them
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId and the wire types
//! ```

mod error;
mod identity;
mod player;
mod registry;

pub use error::SessionError;
pub use identity::{Identity, IdentityService, StaticProfiles};
pub use player::Player;
pub use registry::PlayerRegistry;
