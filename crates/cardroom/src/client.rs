//! Client counterpart: builds request packets and reads responses.
//!
//! One send method per request type, mirroring the server's dispatch
//! table. Every send bumps a local sequence counter; the counter is not
//! interpreted server-side but stays monotonic for correlation.

use cardroom_protocol::{
    CARD_PILE_ARCHIVE, Codec, JsonCodec, LobbyId, PROTOCOL_VERSION, Request,
    Response,
};
use cardroom_transport::{Connection, TcpConnection};

use crate::CardroomError;

/// A connected client for the card-game session protocol.
///
/// # Example
///
/// ```rust,no_run
/// use cardroom::Client;
///
/// # async fn run() -> Result<(), cardroom::CardroomError> {
/// let mut client = Client::connect("127.0.0.1:6567").await?;
/// client.send_version_request().await?;
/// client.send_login_request("Alice", "alice", "alice-token").await?;
/// client.send_global_chat_request("hello everyone").await?;
/// while let Some(response) = client.recv_response().await? {
///     println!("{response:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    conn: TcpConnection,
    codec: JsonCodec,
    sequence: u64,
}

impl Client {
    /// Connects to a server.
    pub async fn connect(addr: &str) -> Result<Self, CardroomError> {
        let conn = TcpConnection::connect(addr).await?;
        Ok(Self {
            conn,
            codec: JsonCodec,
            sequence: 0,
        })
    }

    /// The number of requests sent on this connection.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Announces the protocol version this client speaks.
    pub async fn send_version_request(&mut self) -> Result<(), CardroomError> {
        self.send_request(&Request::Version {
            version: PROTOCOL_VERSION,
        })
        .await
    }

    /// Authenticates as `id`, displaying as `name`.
    pub async fn send_login_request(
        &mut self,
        name: &str,
        id: &str,
        token: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::Login {
            name: name.to_string(),
            id: id.into(),
            token: token.to_string(),
        })
        .await
    }

    /// Announces an orderly disconnect.
    pub async fn send_exit_request(&mut self) -> Result<(), CardroomError> {
        self.send_request(&Request::Exit).await
    }

    /// Asks the server to create a lobby with this client as host.
    pub async fn send_create_lobby_request(
        &mut self,
        name: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::CreateLobby {
            name: name.to_string(),
        })
        .await
    }

    /// Requests the roster of logged-in players.
    pub async fn send_player_list_request(&mut self) -> Result<(), CardroomError> {
        self.send_request(&Request::PlayerList).await
    }

    /// Sends a chat line to every logged-in player.
    pub async fn send_global_chat_request(
        &mut self,
        message: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::GlobalChat {
            message: message.to_string(),
        })
        .await
    }

    /// Sends a chat line to the client's lobby.
    pub async fn send_lobby_chat_request(
        &mut self,
        message: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::LobbyChat {
            message: message.to_string(),
        })
        .await
    }

    /// Requests the list of open lobbies.
    pub async fn send_lobby_list_request(&mut self) -> Result<(), CardroomError> {
        self.send_request(&Request::LobbyList).await
    }

    /// Joins a lobby by display name.
    pub async fn send_join_lobby_request(
        &mut self,
        query: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::JoinLobby {
            id: None,
            name: query.to_string(),
        })
        .await
    }

    /// Joins a lobby directly by ID.
    pub async fn send_join_lobby_request_by_id(
        &mut self,
        id: LobbyId,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::JoinLobby {
            id: Some(id),
            name: String::new(),
        })
        .await
    }

    /// Leaves a lobby by display name.
    pub async fn send_leave_lobby_request(
        &mut self,
        query: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::LeaveLobby {
            id: None,
            name: query.to_string(),
        })
        .await
    }

    /// Leaves a lobby directly by ID.
    pub async fn send_leave_lobby_request_by_id(
        &mut self,
        id: LobbyId,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::LeaveLobby {
            id: Some(id),
            name: String::new(),
        })
        .await
    }

    /// Asks the host's lobby to remove `target`.
    pub async fn send_lobby_kick_request(
        &mut self,
        target: &str,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::LobbyKick {
            target: target.into(),
        })
        .await
    }

    /// Requests a card pile by index.
    pub async fn send_card_pile_request(
        &mut self,
        pile: u8,
    ) -> Result<(), CardroomError> {
        self.send_request(&Request::CardPile { pile }).await
    }

    /// Requests the archive pile.
    pub async fn send_archive_pile_request(&mut self) -> Result<(), CardroomError> {
        self.send_card_pile_request(CARD_PILE_ARCHIVE).await
    }

    /// Reads the next response frame.
    ///
    /// Returns `Ok(None)` once the server has closed the connection.
    pub async fn recv_response(&self) -> Result<Option<Response>, CardroomError> {
        match self.conn.recv().await {
            Ok(Some(data)) => Ok(Some(self.codec.decode(&data)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(CardroomError::Transport(e)),
        }
    }

    /// Encodes and writes one request frame.
    ///
    /// The sequence counter covers attempted sends, so it advances even
    /// when the write fails.
    async fn send_request(&mut self, request: &Request) -> Result<(), CardroomError> {
        let bytes = self.codec.encode(request)?;
        let result = self.conn.send(&bytes).await.map_err(CardroomError::Transport);
        self.sequence += 1;
        result
    }
}
