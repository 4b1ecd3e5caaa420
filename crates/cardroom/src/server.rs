//! `CardroomServer` builder and server loop.
//!
//! This is the entry point for running a card-game session server. It
//! ties together all the layers: transport → protocol → session → lobby.

use std::net::SocketAddr;
use std::sync::Arc;

use cardroom_lobby::LobbyRegistry;
use cardroom_protocol::{Codec, JsonCodec};
use cardroom_session::{IdentityService, PlayerRegistry};
use cardroom_transport::{TcpTransport, Transport};
use tokio::sync::RwLock;

use crate::CardroomError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registries live behind `RwLock`s: list and broadcast handlers take
/// the read side, login/logout and membership changes take the write
/// side. No lock is ever held across a network send.
pub(crate) struct ServerState<I: IdentityService, C: Codec> {
    pub(crate) players: RwLock<PlayerRegistry>,
    pub(crate) lobbies: RwLock<LobbyRegistry>,
    pub(crate) identity: I,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Cardroom server.
///
/// # Example
///
/// ```rust,ignore
/// use cardroom::prelude::*;
///
/// let server = CardroomServer::builder()
///     .bind("0.0.0.0:6567")
///     .build(my_identity_service)
///     .await?;
/// server.run().await
/// ```
pub struct CardroomServerBuilder {
    bind_addr: String,
}

impl CardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:6567".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds and starts the server with the given identity service.
    ///
    /// Uses `JsonCodec` over length-prefixed TCP frames.
    pub async fn build<I: IdentityService>(
        self,
        identity: I,
    ) -> Result<CardroomServer<I, JsonCodec>, CardroomError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            players: RwLock::new(PlayerRegistry::new()),
            lobbies: RwLock::new(LobbyRegistry::new()),
            identity,
            codec: JsonCodec,
        });

        Ok(CardroomServer { transport, state })
    }
}

impl Default for CardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cardroom session server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardroomServer<I: IdentityService, C: Codec> {
    transport: TcpTransport,
    state: Arc<ServerState<I, C>>,
}

impl<I, C> CardroomServer<I, C>
where
    I: IdentityService,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> CardroomServerBuilder {
        CardroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, CardroomError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CardroomError> {
        tracing::info!("cardroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
