//! Per-connection handler: decode loop, dispatch, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Loop: receive frames → decode one `Request` per frame
//!   2. Dispatch the request to its handler
//!   3. On any exit path, deregister the player and notify their lobby
//!
//! There is no handshake phase: a connection may send any request at any
//! time, but every handler except Version and Login first resolves the
//! connection to a logged-in player and silently drops the request when
//! that lookup fails.

use std::sync::Arc;

use cardroom_lobby::LobbyError;
use cardroom_protocol::{
    Codec, LobbyId, PROTOCOL_VERSION, PlayerId, Request, Response,
};
use cardroom_session::{IdentityService, Player};
use cardroom_transport::{Connection, ConnectionId, TcpConnection};

use crate::CardroomError;
use crate::server::ServerState;

/// What the connection loop should do after a request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Keep serving requests on this connection.
    Continue,
    /// Stop the loop; the connection is done.
    Close,
}

/// Drop guard that cleans up a connection's player when the handler exits.
///
/// Cleanup covers every exit path: explicit Exit, version rejection,
/// abrupt socket close, handler errors, and panics. Since `Drop` is
/// synchronous, we spawn a fire-and-forget task for the async lock work.
struct ConnectionGuard<I: IdentityService, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<I, C>>,
}

impl<I: IdentityService, C: Codec> Drop for ConnectionGuard<I, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            disconnect_cleanup(conn_id, state).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<I, C>(
    conn: TcpConnection,
    state: Arc<ServerState<I, C>>,
) -> Result<(), CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let request: Request = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                continue;
            }
        };

        if dispatch(&conn, &state, request).await? == Flow::Close {
            break;
        }
    }

    // _guard drops here → disconnect cleanup fires.
    Ok(())
}

/// Routes one decoded request to its handler.
async fn dispatch<I, C>(
    conn: &Arc<TcpConnection>,
    state: &Arc<ServerState<I, C>>,
    request: Request,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    match request {
        Request::Version { version } => handle_version(conn, state, version).await,
        Request::Login { name, id, token } => {
            handle_login(conn, state, name, id, token).await
        }
        Request::Exit => handle_exit(conn, state).await,
        Request::CreateLobby { name } => handle_create_lobby(conn, state, name).await,
        Request::PlayerList => handle_player_list(conn, state).await,
        Request::GlobalChat { message } => {
            handle_global_chat(conn, state, message).await
        }
        Request::LobbyChat { .. } => {
            tracing::trace!(conn_id = %conn.id(), "lobby chat ignored");
            Ok(Flow::Continue)
        }
        Request::LobbyList => handle_lobby_list(conn, state).await,
        Request::JoinLobby { id, name } => {
            handle_join_lobby(conn, state, id, name).await
        }
        Request::LeaveLobby { id, name } => {
            handle_leave_lobby(conn, state, id, name).await
        }
        Request::LobbyKick { target } => handle_lobby_kick(conn, state, target).await,
        Request::CardPile { pile } => {
            tracing::trace!(conn_id = %conn.id(), pile, "card pile request ignored");
            Ok(Flow::Continue)
        }
        Request::Unknown => {
            tracing::trace!(conn_id = %conn.id(), "unknown request type ignored");
            Ok(Flow::Continue)
        }
    }
}

/// Exact-match check against [`PROTOCOL_VERSION`].
///
/// A matching version is acknowledged by silence. A mismatch gets one
/// error packet and then the connection is closed without dispatching
/// anything further.
async fn handle_version<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    version: u32,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    if version == PROTOCOL_VERSION {
        tracing::trace!(conn_id = %conn.id(), version, "protocol version accepted");
        return Ok(Flow::Continue);
    }

    tracing::debug!(
        conn_id = %conn.id(),
        client = version,
        server = PROTOCOL_VERSION,
        "client sent a mismatching protocol version"
    );
    send_error(conn, &state.codec, "Protocol version mismatch.").await?;
    let _ = conn.close().await;
    Ok(Flow::Close)
}

/// Login: identity lookup, ID cross-check, then registration.
///
/// Every failure is answered with the same "Login failed." packet so a
/// probing client learns nothing about which step rejected it. Only an
/// identity mismatch also closes the connection — presenting a valid
/// token while claiming someone else's ID is the one case treated as
/// hostile rather than mistaken.
async fn handle_login<I, C>(
    conn: &Arc<TcpConnection>,
    state: &Arc<ServerState<I, C>>,
    name: String,
    id: PlayerId,
    token: String,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let conn_id = conn.id();

    let identity = match state.identity.retrieve_profile(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "identity service rejected login");
            send_error(conn, &state.codec, "Login failed.").await?;
            return Ok(Flow::Continue);
        }
    };

    if identity.id != id {
        tracing::info!(
            %conn_id,
            claimed = %id,
            actual = %identity.id,
            "login claimed a foreign identity"
        );
        send_error(conn, &state.codec, "Login failed.").await?;
        let _ = conn.close().await;
        return Ok(Flow::Close);
    }

    let player = Arc::new(Player::new(identity.id, &name, Arc::clone(conn)));
    let inserted = {
        let mut players = state.players.write().await;
        players.insert(Arc::clone(&player))
    };

    match inserted {
        Ok(()) => {
            tracing::info!(%conn_id, player_id = %player.id, name = %name, "player logged in");
        }
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "login rejected");
            send_error(conn, &state.codec, "Login failed.").await?;
        }
    }
    Ok(Flow::Continue)
}

/// Orderly exit: close the connection and let the drop guard handle
/// deregistration and lobby notifications.
async fn handle_exit<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "exit from an unregistered connection");
        return Ok(Flow::Continue);
    };

    tracing::info!(player_id = %player.id, "player exited");
    let _ = conn.close().await;
    Ok(Flow::Close)
}

/// Creates a lobby with the requester as host and sole member.
async fn handle_create_lobby<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    name: String,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "create lobby from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let created = {
        let mut lobbies = state.lobbies.write().await;
        lobbies.create(&name, player.id.clone())
    };

    match created {
        Ok(lobby_id) => {
            send_response(&player, &state.codec, &Response::CreateLobby { lobby_id })
                .await?;
        }
        Err(e) => {
            tracing::debug!(player_id = %player.id, error = %e, "create lobby refused");
            send_error(conn, &state.codec, &e.to_string()).await?;
        }
    }
    Ok(Flow::Continue)
}

/// Snapshot of every logged-in player, sent to the requester only.
async fn handle_player_list<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "player list request from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let entries: Vec<_> = {
        let players = state.players.read().await;
        players.players().iter().map(|p| p.entry()).collect()
    };

    tracing::info!(player_id = %player.id, count = entries.len(), "player list requested");

    let response = Response::PlayerList {
        count: entries.len() as u32,
        players: entries,
    };
    send_response(&player, &state.codec, &response).await?;
    Ok(Flow::Continue)
}

/// Broadcast one chat line to every logged-in player.
async fn handle_global_chat<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    message: String,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "global chat from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let sender = player.name.clone();
    let recipients = {
        let players = state.players.read().await;
        players.players()
    };

    tracing::info!(
        sender = %sender,
        recipients = recipients.len(),
        message = %message,
        "global chat"
    );

    let response = Response::GlobalChat { sender, message };

    // Each send serializes on that recipient's own connection lock,
    // acquired and released per iteration. A dead recipient costs a log
    // line, not the broadcast.
    for recipient in &recipients {
        if let Err(e) = send_response(recipient, &state.codec, &response).await {
            tracing::debug!(player_id = %recipient.id, error = %e, "chat delivery failed");
        }
    }
    Ok(Flow::Continue)
}

/// Snapshot of every open lobby, sent to the requester only.
async fn handle_lobby_list<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "lobby list request from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let entries = {
        let lobbies = state.lobbies.read().await;
        lobbies.entries()
    };

    tracing::info!(player_id = %player.id, count = entries.len(), "lobby list requested");

    let response = Response::LobbyList {
        count: entries.len() as u32,
        lobbies: entries,
    };
    send_response(&player, &state.codec, &response).await?;
    Ok(Flow::Continue)
}

/// Adds the requester to a lobby, resolved by ID first and name second,
/// and notifies every member including the joiner.
async fn handle_join_lobby<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    id: Option<LobbyId>,
    name: String,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "join lobby from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let joined = {
        let mut lobbies = state.lobbies.write().await;
        match lobbies.resolve(id, &name) {
            Ok(lobby_id) => lobbies.join(lobby_id, player.id.clone()).map(|()| {
                let lobby = lobbies.get(lobby_id).expect("joined lobby is live");
                (lobby_id, lobby.name.clone(), lobby.members().to_vec())
            }),
            Err(e) => Err(e),
        }
    };

    match joined {
        Ok((lobby_id, lobby_name, members)) => {
            let response = Response::JoinLobby {
                name: lobby_name,
                lobby_id,
                success: true,
            };
            notify_members(state, &members, &response).await;
        }
        Err(e) => {
            tracing::debug!(player_id = %player.id, error = %e, "join lobby failed");
            send_error(conn, &state.codec, &e.to_string()).await?;
        }
    }
    Ok(Flow::Continue)
}

/// Removes the requester from a lobby and notifies the remaining
/// members. The departing player gets no packet of their own.
async fn handle_leave_lobby<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    id: Option<LobbyId>,
    name: String,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "leave lobby from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let left = {
        let mut lobbies = state.lobbies.write().await;
        if lobbies.lobby_of(&player.id).is_none() {
            Err(LobbyError::NotInLobby(player.id.clone()))
        } else {
            match lobbies.resolve(id, &name) {
                Ok(lobby_id) => lobbies.remove_from(lobby_id, &player.id),
                Err(e) => Err(e),
            }
        }
    };

    match left {
        Ok(notice) => {
            let response = Response::LeaveLobby {
                name: notice.lobby_name.clone(),
                lobby_id: notice.lobby_id,
                success: true,
            };
            notify_members(state, &notice.remaining, &response).await;
        }
        Err(e) => {
            tracing::debug!(player_id = %player.id, error = %e, "leave lobby failed");
            send_error(conn, &state.codec, &e.to_string()).await?;
        }
    }
    Ok(Flow::Continue)
}

/// Removes a target player from the requester's lobby.
///
/// Host-only. Both the requester and the target are told the kick
/// happened; the rest of the lobby is not.
async fn handle_lobby_kick<I, C>(
    conn: &TcpConnection,
    state: &Arc<ServerState<I, C>>,
    target: PlayerId,
) -> Result<Flow, CardroomError>
where
    I: IdentityService,
    C: Codec,
{
    let Some(player) = resolve_player(state, conn.id()).await else {
        tracing::debug!(conn_id = %conn.id(), "kick from an unregistered connection");
        return Ok(Flow::Continue);
    };

    let target_player = {
        let players = state.players.read().await;
        players.get_by_id(&target)
    };
    let Some(target_player) = target_player else {
        tracing::debug!(player_id = %player.id, target = %target, "kick target is not logged in");
        return Ok(Flow::Continue);
    };

    let kicked = {
        let mut lobbies = state.lobbies.write().await;
        lobbies.kick(&player.id, &target)
    };

    match kicked {
        Ok(_notice) => {
            tracing::info!(player_id = %player.id, target = %target, "player kicked from lobby");
            let response = Response::LobbyKick {
                target: target.clone(),
                success: true,
            };
            send_response(&player, &state.codec, &response).await?;
            if let Err(e) = send_response(&target_player, &state.codec, &response).await
            {
                tracing::debug!(target = %target, error = %e, "kick notification failed");
            }
        }
        Err(e @ LobbyError::NotHost { .. }) => {
            tracing::info!(
                player_id = %player.id,
                target = %target,
                "kick refused; requester is not the host"
            );
            send_error(conn, &state.codec, &e.to_string()).await?;
        }
        Err(e) => {
            tracing::debug!(player_id = %player.id, error = %e, "kick failed");
            send_error(conn, &state.codec, &e.to_string()).await?;
        }
    }
    Ok(Flow::Continue)
}

// =========================================================================
// Shared plumbing
// =========================================================================

/// Resolves the player bound to a connection, if any.
///
/// Requests from connections that never logged in resolve to `None`; the
/// caller logs the drop and the client hears nothing.
async fn resolve_player<I, C>(
    state: &Arc<ServerState<I, C>>,
    conn_id: ConnectionId,
) -> Option<Arc<Player>>
where
    I: IdentityService,
    C: Codec,
{
    let players = state.players.read().await;
    players.get(conn_id)
}

/// Removes a connection's player from both registries and tells any
/// lobby mates they left.
///
/// This is the single cleanup path for every way a connection can end.
async fn disconnect_cleanup<I, C>(conn_id: ConnectionId, state: Arc<ServerState<I, C>>)
where
    I: IdentityService,
    C: Codec,
{
    let player = {
        let mut players = state.players.write().await;
        players.remove(conn_id)
    };
    let Some(player) = player else {
        return;
    };

    let notice = {
        let mut lobbies = state.lobbies.write().await;
        lobbies.remove_player(&player.id)
    };
    let Some(notice) = notice else {
        return;
    };

    let response = Response::LeaveLobby {
        name: notice.lobby_name.clone(),
        lobby_id: notice.lobby_id,
        success: true,
    };
    notify_members(&state, &notice.remaining, &response).await;
}

/// Fans a response out to the given players, one connection lock at a
/// time. Delivery failures are logged and skipped.
async fn notify_members<I, C>(
    state: &Arc<ServerState<I, C>>,
    members: &[PlayerId],
    response: &Response,
) where
    I: IdentityService,
    C: Codec,
{
    let recipients = {
        let players = state.players.read().await;
        members
            .iter()
            .filter_map(|id| players.get_by_id(id))
            .collect::<Vec<_>>()
    };

    for recipient in &recipients {
        if let Err(e) = send_response(recipient, &state.codec, response).await {
            tracing::debug!(player_id = %recipient.id, error = %e, "lobby notification failed");
        }
    }
}

/// Sends a response to a logged-in player and bumps their sequence.
async fn send_response<C: Codec>(
    player: &Player,
    codec: &C,
    response: &Response,
) -> Result<(), CardroomError> {
    let bytes = codec.encode(response)?;
    player
        .conn
        .send(&bytes)
        .await
        .map_err(CardroomError::Transport)?;
    player.bump_sequence();
    Ok(())
}

/// Sends an `Error` packet on a raw connection.
///
/// Works pre-login, so version rejections and failed logins can still be
/// answered.
async fn send_error<C: Codec>(
    conn: &TcpConnection,
    codec: &C,
    message: &str,
) -> Result<(), CardroomError> {
    let response = Response::Error {
        message: message.to_string(),
    };
    let bytes = codec.encode(&response)?;
    conn.send(&bytes).await.map_err(CardroomError::Transport)?;
    Ok(())
}
