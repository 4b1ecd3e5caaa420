//! # Cardroom
//!
//! Session server for multiplayer card games.
//!
//! Cardroom provides the out-of-game plumbing a card game needs before a
//! match starts: a TCP packet protocol, login against a pluggable
//! identity service, a player registry, global chat, and lobbies with a
//! host, member list, and kick privileges. The server is authoritative;
//! clients speak a small tagged-JSON protocol over length-prefixed
//! frames.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! # async fn run() -> Result<(), CardroomError> {
//! let identity = StaticProfiles::new().grant("alice-token", "alice");
//!
//! let server = CardroomServer::<StaticProfiles, JsonCodec>::builder()
//!     .bind("0.0.0.0:6567")
//!     .build(identity)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod client;
mod error;
mod handler;
mod server;

pub use client::Client;
pub use error::CardroomError;
pub use server::{CardroomServer, CardroomServerBuilder};

/// Everything needed to run a server or drive a client.
pub mod prelude {
    pub use cardroom_lobby::{DepartureNotice, Lobby, LobbyError, LobbyRegistry};
    pub use cardroom_protocol::{
        CARD_PILE_ARCHIVE, Codec, JsonCodec, LobbyEntry, LobbyId,
        PROTOCOL_VERSION, PlayerEntry, PlayerId, ProtocolError, Request,
        Response,
    };
    pub use cardroom_session::{
        Identity, IdentityService, Player, PlayerRegistry, SessionError,
        StaticProfiles,
    };
    pub use cardroom_transport::{
        Connection, ConnectionId, TcpConnection, TcpTransport, Transport,
        TransportError,
    };

    pub use crate::{CardroomError, CardroomServer, CardroomServerBuilder, Client};
}
