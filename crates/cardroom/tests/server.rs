//! Integration tests for the Cardroom server: login, lobbies, chat, and
//! full connection lifecycles over real sockets.

use std::time::Duration;

use cardroom::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

/// Identity service for the tests: `<id>-token` authenticates `<id>`.
fn test_profiles() -> StaticProfiles {
    StaticProfiles::new()
        .grant("alice-token", "alice")
        .grant("bob-token", "bob")
        .grant("carol-token", "carol")
}

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = CardroomServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(test_profiles())
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> Client {
    Client::connect(addr).await.expect("should connect")
}

/// Reads the next response, failing the test if none arrives in time.
async fn recv(client: &Client) -> Response {
    tokio::time::timeout(Duration::from_secs(2), client.recv_response())
        .await
        .expect("response should arrive in time")
        .expect("recv should succeed")
        .expect("connection should stay open")
}

/// Asserts that the server closes the connection instead of answering.
async fn recv_closed(client: &Client) {
    let response = tokio::time::timeout(Duration::from_secs(2), client.recv_response())
        .await
        .expect("close should arrive in time")
        .expect("recv should succeed");
    assert!(response.is_none(), "expected a closed connection, got {response:?}");
}

/// Logs in and round-trips a player list so the registration is visible
/// to every test step that follows.
async fn login(client: &mut Client, name: &str, id: &str) {
    let token = format!("{id}-token");
    client
        .send_login_request(name, id, &token)
        .await
        .expect("send login");
    client
        .send_player_list_request()
        .await
        .expect("send player list");
    match recv(client).await {
        Response::PlayerList { .. } => {}
        other => panic!("expected PlayerList after login, got {other:?}"),
    }
}

/// Fetches the current roster as `(id, name)` pairs.
async fn player_roster(client: &mut Client) -> Vec<(String, String)> {
    client
        .send_player_list_request()
        .await
        .expect("send player list");
    match recv(client).await {
        Response::PlayerList { count, players } => {
            assert_eq!(count as usize, players.len());
            players
                .into_iter()
                .map(|entry| (entry.id.0, entry.name))
                .collect()
        }
        other => panic!("expected PlayerList, got {other:?}"),
    }
}

/// Creates a lobby and returns its ID from the response.
async fn create_lobby(client: &mut Client, name: &str) -> LobbyId {
    client
        .send_create_lobby_request(name)
        .await
        .expect("send create lobby");
    match recv(client).await {
        Response::CreateLobby { lobby_id } => lobby_id,
        other => panic!("expected CreateLobby, got {other:?}"),
    }
}

/// Joins by lobby name and drains the join echo from the joiner's stream.
async fn join_lobby(client: &mut Client, lobby_name: &str, lobby_id: LobbyId) {
    client
        .send_join_lobby_request(lobby_name)
        .await
        .expect("send join lobby");
    assert_eq!(
        recv(client).await,
        Response::JoinLobby {
            name: lobby_name.to_string(),
            lobby_id,
            success: true,
        }
    );
}

/// Sends a raw pre-encoded request over a bare connection.
async fn send_raw(conn: &TcpConnection, request: &Request) {
    let bytes = serde_json::to_vec(request).expect("encode");
    conn.send(&bytes).await.expect("send");
}

/// Reads and decodes one response frame from a bare connection.
async fn recv_raw(conn: &TcpConnection) -> Option<Response> {
    let data = tokio::time::timeout(Duration::from_secs(2), conn.recv())
        .await
        .expect("response should arrive in time")
        .expect("recv should succeed")?;
    Some(serde_json::from_slice(&data).expect("decode"))
}

// =========================================================================
// Version handshake
// =========================================================================

#[tokio::test]
async fn test_version_match_is_accepted_silently() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    client.send_version_request().await.expect("send version");
    login(&mut client, "Alice", "alice").await;

    // The first and only response was the PlayerList consumed by login:
    // a matching version produces no packet of its own.
    let roster = player_roster(&mut client).await;
    assert_eq!(roster, vec![("alice".to_string(), "Alice".to_string())]);
}

#[tokio::test]
async fn test_version_mismatch_rejected_and_closed() {
    let addr = start_server().await;
    let conn = TcpConnection::connect(&addr).await.expect("should connect");

    send_raw(&conn, &Request::Version { version: 999 }).await;

    assert_eq!(
        recv_raw(&conn).await,
        Some(Response::Error {
            message: "Protocol version mismatch.".to_string(),
        })
    );
    assert_eq!(recv_raw(&conn).await, None, "connection should be closed");
}

#[tokio::test]
async fn test_version_mismatch_stops_all_dispatch() {
    let addr = start_server().await;
    let conn = TcpConnection::connect(&addr).await.expect("should connect");

    send_raw(&conn, &Request::Version { version: 2 }).await;
    // These land behind the rejected version packet; the server must
    // close without looking at them. Sends may fail if the close has
    // already reached us, which is just as good.
    let login_frame = serde_json::to_vec(&Request::Login {
        name: "Alice".to_string(),
        id: "alice".into(),
        token: "alice-token".to_string(),
    })
    .expect("encode");
    let _ = conn.send(&login_frame).await;
    let list_frame = serde_json::to_vec(&Request::PlayerList).expect("encode");
    let _ = conn.send(&list_frame).await;

    assert_eq!(
        recv_raw(&conn).await,
        Some(Response::Error {
            message: "Protocol version mismatch.".to_string(),
        })
    );
    assert_eq!(
        recv_raw(&conn).await,
        None,
        "nothing after the version error should be dispatched"
    );
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_success_appears_in_player_list() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    login(&mut client, "Alice", "alice").await;

    let roster = player_roster(&mut client).await;
    assert_eq!(roster, vec![("alice".to_string(), "Alice".to_string())]);
}

#[tokio::test]
async fn test_login_with_unknown_token_fails_but_connection_survives() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    client
        .send_login_request("Alice", "alice", "stolen-token")
        .await
        .expect("send login");
    assert_eq!(
        recv(&client).await,
        Response::Error {
            message: "Login failed.".to_string(),
        }
    );

    // Same connection, correct token: the earlier failure cost nothing.
    login(&mut client, "Alice", "alice").await;
    let roster = player_roster(&mut client).await;
    assert_eq!(roster, vec![("alice".to_string(), "Alice".to_string())]);
}

#[tokio::test]
async fn test_login_claiming_foreign_identity_closes_connection() {
    let addr = start_server().await;
    let mut mallory = connect(&addr).await;

    // A valid token for "alice", claiming to be "bob".
    mallory
        .send_login_request("Mallory", "bob", "alice-token")
        .await
        .expect("send login");

    assert_eq!(
        recv(&mallory).await,
        Response::Error {
            message: "Login failed.".to_string(),
        }
    );
    recv_closed(&mallory).await;

    // Nobody got registered by the failed attempt.
    let mut carol = connect(&addr).await;
    login(&mut carol, "Carol", "carol").await;
    let roster = player_roster(&mut carol).await;
    assert_eq!(roster, vec![("carol".to_string(), "Carol".to_string())]);
}

#[tokio::test]
async fn test_duplicate_login_for_live_id_is_rejected() {
    let addr = start_server().await;
    let mut first = connect(&addr).await;
    login(&mut first, "Alice", "alice").await;

    let mut second = connect(&addr).await;
    second
        .send_login_request("Alice Again", "alice", "alice-token")
        .await
        .expect("send login");
    assert_eq!(
        recv(&second).await,
        Response::Error {
            message: "Login failed.".to_string(),
        }
    );

    // The rejected connection stays usable for a different identity.
    login(&mut second, "Bob", "bob").await;
    let roster = player_roster(&mut second).await;
    assert_eq!(
        roster,
        vec![
            ("alice".to_string(), "Alice".to_string()),
            ("bob".to_string(), "Bob".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_second_login_on_bound_connection_is_rejected() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;
    login(&mut client, "Alice", "alice").await;

    client
        .send_login_request("Bob", "bob", "bob-token")
        .await
        .expect("send login");
    assert_eq!(
        recv(&client).await,
        Response::Error {
            message: "Login failed.".to_string(),
        }
    );

    let roster = player_roster(&mut client).await;
    assert_eq!(
        roster,
        vec![("alice".to_string(), "Alice".to_string())],
        "the connection should still be bound to its first login"
    );
}

// =========================================================================
// Exit and disconnect cleanup
// =========================================================================

#[tokio::test]
async fn test_exit_closes_connection_and_deregisters() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    alice.send_exit_request().await.expect("send exit");
    recv_closed(&alice).await;

    // Cleanup runs in a spawned task; give it a moment to land.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let roster = player_roster(&mut bob).await;
    assert_eq!(roster, vec![("bob".to_string(), "Bob".to_string())]);
}

#[tokio::test]
async fn test_abrupt_disconnect_prunes_player_and_notifies_lobby() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert_eq!(
        recv(&alice).await,
        Response::JoinLobby {
            name: "casual".to_string(),
            lobby_id,
            success: true,
        }
    );

    // Bob's socket dies without an Exit packet.
    drop(bob);

    assert_eq!(
        recv(&alice).await,
        Response::LeaveLobby {
            name: "casual".to_string(),
            lobby_id,
            success: true,
        },
        "remaining members should hear about the disconnect"
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    let roster = player_roster(&mut alice).await;
    assert_eq!(roster, vec![("alice".to_string(), "Alice".to_string())]);
}

// =========================================================================
// Lobby create and list
// =========================================================================

#[tokio::test]
async fn test_create_lobby_returns_new_lobby_id() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;

    alice
        .send_lobby_list_request()
        .await
        .expect("send lobby list");
    match recv(&alice).await {
        Response::LobbyList { count, lobbies } => {
            assert_eq!(count, 1);
            assert_eq!(lobbies[0].id, lobby_id);
            assert_eq!(lobbies[0].name, "casual");
        }
        other => panic!("expected LobbyList, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_lobby_while_in_lobby_is_refused() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;

    create_lobby(&mut alice, "first").await;
    alice
        .send_create_lobby_request("second")
        .await
        .expect("send create lobby");

    assert_eq!(
        recv(&alice).await,
        Response::Error {
            message: "player is already in a lobby".to_string(),
        }
    );
}

#[tokio::test]
async fn test_lobby_list_preserves_creation_order() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    let mut carol = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;
    login(&mut carol, "Carol", "carol").await;

    let first = create_lobby(&mut alice, "first").await;
    let second = create_lobby(&mut bob, "second").await;

    carol
        .send_lobby_list_request()
        .await
        .expect("send lobby list");
    match recv(&carol).await {
        Response::LobbyList { count, lobbies } => {
            assert_eq!(count, 2);
            let listed: Vec<(LobbyId, String)> =
                lobbies.into_iter().map(|e| (e.id, e.name)).collect();
            assert_eq!(
                listed,
                vec![
                    (first, "first".to_string()),
                    (second, "second".to_string()),
                ]
            );
        }
        other => panic!("expected LobbyList, got {other:?}"),
    }
}

// =========================================================================
// Join and leave
// =========================================================================

#[tokio::test]
async fn test_join_by_name_notifies_every_member() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;

    // The existing member hears about the arrival too.
    assert_eq!(
        recv(&alice).await,
        Response::JoinLobby {
            name: "casual".to_string(),
            lobby_id,
            success: true,
        }
    );
}

#[tokio::test]
async fn test_join_by_id_matches_join_by_name() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;

    bob.send_join_lobby_request_by_id(lobby_id)
        .await
        .expect("send join lobby");

    let expected = Response::JoinLobby {
        name: "casual".to_string(),
        lobby_id,
        success: true,
    };
    assert_eq!(recv(&bob).await, expected);
    assert_eq!(recv(&alice).await, expected);
}

#[tokio::test]
async fn test_join_missing_lobby_fails_with_lookup_error() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;

    alice
        .send_join_lobby_request("nowhere")
        .await
        .expect("send join lobby");

    assert_eq!(
        recv(&alice).await,
        Response::Error {
            message: "no such lobby found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_leave_notifies_remaining_members_only() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert_eq!(
        recv(&alice).await,
        Response::JoinLobby {
            name: "casual".to_string(),
            lobby_id,
            success: true,
        }
    );

    bob.send_leave_lobby_request("casual")
        .await
        .expect("send leave lobby");

    assert_eq!(
        recv(&alice).await,
        Response::LeaveLobby {
            name: "casual".to_string(),
            lobby_id,
            success: true,
        }
    );

    // The leaver gets no packet: their next response is the roster they
    // ask for, not a stray LeaveLobby.
    let roster = player_roster(&mut bob).await;
    assert_eq!(roster.len(), 2);
}

#[tokio::test]
async fn test_leave_without_lobby_fails_with_state_error() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;

    alice
        .send_leave_lobby_request("casual")
        .await
        .expect("send leave lobby");

    assert_eq!(
        recv(&alice).await,
        Response::Error {
            message: "player is not in a lobby".to_string(),
        }
    );
}

#[tokio::test]
async fn test_host_leave_promotes_oldest_remaining_member() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    let mut carol = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;
    login(&mut carol, "Carol", "carol").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert!(matches!(recv(&alice).await, Response::JoinLobby { .. }));
    join_lobby(&mut carol, "casual", lobby_id).await;
    assert!(matches!(recv(&alice).await, Response::JoinLobby { .. }));
    assert!(matches!(recv(&bob).await, Response::JoinLobby { .. }));

    alice
        .send_leave_lobby_request("casual")
        .await
        .expect("send leave lobby");
    assert!(matches!(recv(&bob).await, Response::LeaveLobby { .. }));
    assert!(matches!(recv(&carol).await, Response::LeaveLobby { .. }));

    // Bob joined first, so the lobby is his now; a kick proves it.
    bob.send_lobby_kick_request("carol")
        .await
        .expect("send kick");
    let expected = Response::LobbyKick {
        target: "carol".into(),
        success: true,
    };
    assert_eq!(recv(&bob).await, expected);
    assert_eq!(recv(&carol).await, expected);
}

// =========================================================================
// Kick
// =========================================================================

#[tokio::test]
async fn test_kick_by_host_notifies_kicker_and_target() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert!(matches!(recv(&alice).await, Response::JoinLobby { .. }));

    alice
        .send_lobby_kick_request("bob")
        .await
        .expect("send kick");

    let expected = Response::LobbyKick {
        target: "bob".into(),
        success: true,
    };
    assert_eq!(recv(&alice).await, expected);
    assert_eq!(recv(&bob).await, expected);

    // Bob really is out: nothing blocks him hosting his own lobby.
    create_lobby(&mut bob, "refuge").await;
}

#[tokio::test]
async fn test_kick_by_non_host_is_refused() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert!(matches!(recv(&alice).await, Response::JoinLobby { .. }));

    bob.send_lobby_kick_request("alice")
        .await
        .expect("send kick");

    assert_eq!(
        recv(&bob).await,
        Response::Error {
            message: "insufficient privileges; must be lobby host to kick users"
                .to_string(),
        }
    );

    // The member set is untouched: the real host can still kick bob.
    alice
        .send_lobby_kick_request("bob")
        .await
        .expect("send kick");
    let expected = Response::LobbyKick {
        target: "bob".into(),
        success: true,
    };
    assert_eq!(recv(&alice).await, expected);
    assert_eq!(recv(&bob).await, expected);
}

#[tokio::test]
async fn test_kick_self_acts_as_host_leave() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;

    let lobby_id = create_lobby(&mut alice, "casual").await;
    join_lobby(&mut bob, "casual", lobby_id).await;
    assert!(matches!(recv(&alice).await, Response::JoinLobby { .. }));

    alice
        .send_lobby_kick_request("alice")
        .await
        .expect("send kick");

    // Requester and target are the same player: two notifications.
    let expected = Response::LobbyKick {
        target: "alice".into(),
        success: true,
    };
    assert_eq!(recv(&alice).await, expected);
    assert_eq!(recv(&alice).await, expected);

    // She's out, so she can host a fresh lobby immediately.
    create_lobby(&mut alice, "encore").await;
}

// =========================================================================
// Chat
// =========================================================================

#[tokio::test]
async fn test_global_chat_reaches_every_player_once() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    let mut carol = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;
    login(&mut carol, "Carol", "carol").await;

    alice
        .send_global_chat_request("hello table")
        .await
        .expect("send chat");

    let expected = Response::GlobalChat {
        sender: "Alice".to_string(),
        message: "hello table".to_string(),
    };
    assert_eq!(recv(&alice).await, expected);
    assert_eq!(recv(&bob).await, expected);
    assert_eq!(recv(&carol).await, expected);

    // Exactly once: the next packet on each stream is the roster each
    // client asks for, not a duplicate chat line.
    for client in [&mut alice, &mut bob, &mut carol] {
        let roster = player_roster(client).await;
        assert_eq!(roster.len(), 3);
    }
}

#[tokio::test]
async fn test_concurrent_global_chats_all_delivered() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    let mut carol = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;
    login(&mut bob, "Bob", "bob").await;
    login(&mut carol, "Carol", "carol").await;

    let (a, b, c) = tokio::join!(
        alice.send_global_chat_request("from alice"),
        bob.send_global_chat_request("from bob"),
        carol.send_global_chat_request("from carol"),
    );
    a.expect("alice send");
    b.expect("bob send");
    c.expect("carol send");

    let mut expected = vec![
        ("Alice".to_string(), "from alice".to_string()),
        ("Bob".to_string(), "from bob".to_string()),
        ("Carol".to_string(), "from carol".to_string()),
    ];
    expected.sort();

    for client in [&alice, &bob, &carol] {
        let mut seen = Vec::new();
        for _ in 0..3 {
            match recv(client).await {
                Response::GlobalChat { sender, message } => {
                    seen.push((sender, message));
                }
                other => panic!("expected GlobalChat, got {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, expected, "every client observes all three lines");
    }
}

// =========================================================================
// No-op and junk packets
// =========================================================================

#[tokio::test]
async fn test_lobby_chat_and_card_piles_are_noops() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    login(&mut alice, "Alice", "alice").await;

    alice
        .send_lobby_chat_request("anyone here?")
        .await
        .expect("send lobby chat");
    alice.send_card_pile_request(2).await.expect("send card pile");
    alice
        .send_archive_pile_request()
        .await
        .expect("send archive pile");

    // None of the above produced a packet; the roster arrives first.
    let roster = player_roster(&mut alice).await;
    assert_eq!(roster, vec![("alice".to_string(), "Alice".to_string())]);
}

#[tokio::test]
async fn test_garbage_and_unknown_frames_are_skipped() {
    let addr = start_server().await;
    let conn = TcpConnection::connect(&addr).await.expect("should connect");

    // Not JSON at all, then a well-formed packet of an unknown type.
    conn.send(b"not json").await.expect("send garbage");
    conn.send(br#"{"type":"Wibble","weird":true}"#)
        .await
        .expect("send unknown");

    // The connection is still alive and serves a normal session.
    send_raw(
        &conn,
        &Request::Version {
            version: PROTOCOL_VERSION,
        },
    )
    .await;
    send_raw(
        &conn,
        &Request::Login {
            name: "Alice".to_string(),
            id: "alice".into(),
            token: "alice-token".to_string(),
        },
    )
    .await;
    send_raw(&conn, &Request::PlayerList).await;

    match recv_raw(&conn).await {
        Some(Response::PlayerList { count, .. }) => assert_eq!(count, 1),
        other => panic!("expected PlayerList, got {other:?}"),
    }
}

#[tokio::test]
async fn test_requests_before_login_are_silently_dropped() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    // No login yet: these resolve to no player and get no answer.
    client
        .send_global_chat_request("anyone?")
        .await
        .expect("send chat");
    client
        .send_create_lobby_request("ghost lobby")
        .await
        .expect("send create lobby");

    // The first packet this connection ever receives is the post-login
    // roster, so the drops really were silent.
    login(&mut client, "Alice", "alice").await;

    client
        .send_lobby_list_request()
        .await
        .expect("send lobby list");
    match recv(&client).await {
        Response::LobbyList { count, .. } => {
            assert_eq!(count, 0, "the pre-login create must not have happened");
        }
        other => panic!("expected LobbyList, got {other:?}"),
    }
}

// =========================================================================
// Client plumbing
// =========================================================================

#[tokio::test]
async fn test_client_sequence_counts_every_send() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;
    assert_eq!(client.sequence(), 0);

    client.send_version_request().await.expect("send version");
    assert_eq!(client.sequence(), 1);

    client
        .send_login_request("Alice", "alice", "alice-token")
        .await
        .expect("send login");
    assert_eq!(client.sequence(), 2);

    client
        .send_player_list_request()
        .await
        .expect("send player list");
    assert_eq!(client.sequence(), 3);
}
