//! Wire protocol for Cardroom.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Request`], [`Response`], [`PlayerId`], etc.) — the
//!   message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (player identity). It doesn't know about connections or lobbies —
//! it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (frames) → Protocol (Request/Response) → Session (player context)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CARD_PILE_ARCHIVE, LobbyEntry, LobbyId, PROTOCOL_VERSION, PlayerEntry,
    PlayerId, Request, Response,
};
