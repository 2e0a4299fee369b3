//! End-to-end tests: real WebSocket clients against a running server.

use std::time::Duration;

use cubeland::prelude::*;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
///
/// Seeded accounts: `alice` and `bob` (100 coins), `broke` (5 coins),
/// and `keeper` (a worker).
async fn start_server() -> String {
    let accounts = MemoryAccounts::new()
        .with_account("alice", Profile::default())
        .with_account("bob", Profile::default())
        .with_account(
            "broke",
            Profile {
                coins: 5,
                ..Profile::default()
            },
        )
        .with_account(
            "keeper",
            Profile {
                worker: true,
                ..Profile::default()
            },
        );

    let server = CubelandServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(accounts)
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

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: &ClientEvent) {
    let bytes = serde_json::to_vec(event).expect("encode");
    ws.send(Message::Binary(bytes.into())).await.expect("send");
}

/// Receives the next server event, failing the test after 2 seconds.
async fn recv_event(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("recv error");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

/// Reads events until one matches `pick`, failing after a few tries.
/// Lets a test skip interleaved broadcasts it doesn't care about.
async fn recv_until<T>(
    ws: &mut ClientWs,
    pick: impl Fn(ServerEvent) -> Option<T>,
) -> T {
    for _ in 0..10 {
        if let Some(found) = pick(recv_event(ws).await) {
            return found;
        }
    }
    panic!("expected event never arrived");
}

/// Connects and logs in, returning the socket and the Welcome fields.
async fn login(addr: &str, username: &str) -> (ClientWs, RoomId, Vec<PlayerView>, u64) {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        &ClientEvent::Connect {
            username: username.into(),
        },
    )
    .await;
    match recv_event(&mut ws).await {
        ServerEvent::Welcome {
            room_id,
            players,
            coins,
        } => (ws, room_id, players, coins),
        other => panic!("expected Welcome, got {other:?}"),
    }
}

fn lamp_draft(price: u64, global_limit: Option<u32>) -> EntryDraft {
    EntryDraft {
        kind: EntryKind::PlaceableItem {
            behavior: Default::default(),
        },
        title: "Cozy Lamp".into(),
        description: "Mood lighting".into(),
        price,
        image: String::new(),
        global_limit,
        room_limit: None,
    }
}

// =========================================================================
// Connect
// =========================================================================

#[tokio::test]
async fn test_connect_receives_welcome() {
    let addr = start_server().await;
    let (_ws, _room, players, coins) = login(&addr, "alice").await;

    assert_eq!(players.len(), 1);
    assert_eq!(players[0].username, Username::new("alice"));
    assert_eq!(coins, 100);
}

#[tokio::test]
async fn test_unknown_username_is_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientEvent::Connect {
            username: "ghost".into(),
        },
    )
    .await;

    match recv_event(&mut ws).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, 401),
        other => panic!("expected Error 401, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_event_must_be_connect() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientEvent::Chat {
            text: "anyone here?".into(),
        },
    )
    .await;

    match recv_event(&mut ws).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, 400),
        other => panic!("expected Error 400, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_login_is_rejected() {
    let addr = start_server().await;
    let (_ws, _, _, _) = login(&addr, "alice").await;

    let mut second = connect(&addr).await;
    send(
        &mut second,
        &ClientEvent::Connect {
            username: "alice".into(),
        },
    )
    .await;

    match recv_event(&mut second).await {
        ServerEvent::Error { code, .. } => assert_eq!(code, 409),
        other => panic!("expected Error 409, got {other:?}"),
    }
}

// =========================================================================
// Presence
// =========================================================================

#[tokio::test]
async fn test_two_players_share_a_room_and_see_each_other() {
    let addr = start_server().await;

    let (mut ws_alice, room_alice, _, _) = login(&addr, "alice").await;
    let (_ws_bob, room_bob, bob_snapshot, _) = login(&addr, "bob").await;

    assert_eq!(room_alice, room_bob);
    assert_eq!(bob_snapshot.len(), 2);

    let joined = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::PlayerJoined { player } => Some(player),
        _ => None,
    })
    .await;
    assert_eq!(joined.username, Username::new("bob"));
}

#[tokio::test]
async fn test_chat_fans_out_to_both_players() {
    let addr = start_server().await;

    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_bob, _, _, _) = login(&addr, "bob").await;

    send(
        &mut ws_alice,
        &ClientEvent::Chat {
            text: "hi bob".into(),
        },
    )
    .await;

    for ws in [&mut ws_alice, &mut ws_bob] {
        let (from, text) = recv_until(ws, |ev| match ev {
            ServerEvent::Chat { from, text } => Some((from, text)),
            _ => None,
        })
        .await;
        assert_eq!(from, Username::new("alice"));
        assert_eq!(text, "hi bob");
    }
}

#[tokio::test]
async fn test_move_is_clamped_and_seen_by_roommate() {
    let addr = start_server().await;

    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_bob, _, _, _) = login(&addr, "bob").await;

    // 900 is off the map's right edge.
    send(&mut ws_alice, &ClientEvent::Move { x: 900, y: 50 }).await;

    let (username, x, y) = recv_until(&mut ws_bob, |ev| match ev {
        ServerEvent::PlayerMoved { username, x, y } => Some((username, x, y)),
        _ => None,
    })
    .await;
    assert_eq!(username, Username::new("alice"));
    assert_eq!((x, y), (800, 50));
}

#[tokio::test]
async fn test_disconnect_broadcasts_player_left() {
    let addr = start_server().await;

    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_bob, _, _, _) = login(&addr, "bob").await;

    send(&mut ws_bob, &ClientEvent::Disconnect).await;

    let left = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::PlayerLeft { username } => Some(username),
        _ => None,
    })
    .await;
    assert_eq!(left, Username::new("bob"));
}

// =========================================================================
// Marketplace
// =========================================================================

#[tokio::test]
async fn test_list_catalog_starts_empty() {
    let addr = start_server().await;
    let (mut ws, _, _, _) = login(&addr, "alice").await;

    send(&mut ws, &ClientEvent::ListCatalog).await;
    let entries = recv_until(&mut ws, |ev| match ev {
        ServerEvent::Catalog { entries } => Some(entries),
        _ => None,
    })
    .await;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_worker_adds_entry_and_catalog_is_pushed_to_players() {
    let addr = start_server().await;

    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_keeper, _, _, _) = login(&addr, "keeper").await;

    send(
        &mut ws_keeper,
        &ClientEvent::AddEntry {
            draft: lamp_draft(30, None),
        },
    )
    .await;

    // Both players get the refreshed catalog without asking.
    for ws in [&mut ws_alice, &mut ws_keeper] {
        let entries = recv_until(ws, |ev| match ev {
            ServerEvent::Catalog { entries } => Some(entries),
            _ => None,
        })
        .await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Cozy Lamp");
        assert!(!entries[0].sold_out);
    }
}

#[tokio::test]
async fn test_non_worker_cannot_add_entries() {
    let addr = start_server().await;
    let (mut ws, _, _, _) = login(&addr, "alice").await;

    send(
        &mut ws,
        &ClientEvent::AddEntry {
            draft: lamp_draft(30, None),
        },
    )
    .await;

    let code = recv_until(&mut ws, |ev| match ev {
        ServerEvent::Error { code, .. } => Some(code),
        _ => None,
    })
    .await;
    assert_eq!(code, 401);
}

#[tokio::test]
async fn test_purchase_debits_coins() {
    let addr = start_server().await;

    let (mut ws_keeper, _, _, _) = login(&addr, "keeper").await;
    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;

    send(
        &mut ws_keeper,
        &ClientEvent::AddEntry {
            draft: lamp_draft(30, None),
        },
    )
    .await;
    let entries = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::Catalog { entries } => Some(entries),
        _ => None,
    })
    .await;

    send(
        &mut ws_alice,
        &ClientEvent::Purchase {
            entry_id: entries[0].id,
        },
    )
    .await;

    let (entry_id, coins) = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::PurchaseOk { entry_id, coins } => Some((entry_id, coins)),
        _ => None,
    })
    .await;
    assert_eq!(entry_id, entries[0].id);
    assert_eq!(coins, 70);
}

#[tokio::test]
async fn test_purchase_without_enough_coins_fails() {
    let addr = start_server().await;

    let (mut ws_keeper, _, _, _) = login(&addr, "keeper").await;
    let (mut ws_broke, _, _, _) = login(&addr, "broke").await;

    send(
        &mut ws_keeper,
        &ClientEvent::AddEntry {
            draft: lamp_draft(30, None),
        },
    )
    .await;
    let entries = recv_until(&mut ws_broke, |ev| match ev {
        ServerEvent::Catalog { entries } => Some(entries),
        _ => None,
    })
    .await;

    send(
        &mut ws_broke,
        &ClientEvent::Purchase {
            entry_id: entries[0].id,
        },
    )
    .await;

    let code = recv_until(&mut ws_broke, |ev| match ev {
        ServerEvent::Error { code, .. } => Some(code),
        _ => None,
    })
    .await;
    assert_eq!(code, 402);
}

#[tokio::test]
async fn test_sold_out_entry_cannot_be_bought() {
    let addr = start_server().await;

    let (mut ws_keeper, _, _, _) = login(&addr, "keeper").await;
    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_bob, _, _, _) = login(&addr, "bob").await;

    send(
        &mut ws_keeper,
        &ClientEvent::AddEntry {
            draft: lamp_draft(10, Some(1)),
        },
    )
    .await;
    let entries = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::Catalog { entries } => Some(entries),
        _ => None,
    })
    .await;
    let entry_id = entries[0].id;

    send(&mut ws_alice, &ClientEvent::Purchase { entry_id }).await;
    recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::PurchaseOk { .. } => Some(()),
        _ => None,
    })
    .await;

    send(&mut ws_bob, &ClientEvent::Purchase { entry_id }).await;
    let code = recv_until(&mut ws_bob, |ev| match ev {
        ServerEvent::Error { code, .. } => Some(code),
        _ => None,
    })
    .await;
    assert_eq!(code, 409);
}

// =========================================================================
// Party invites over the wire
// =========================================================================

#[tokio::test]
async fn test_party_invite_accept_teleports_over_the_wire() {
    let addr = start_server().await;

    let (mut ws_alice, _, _, _) = login(&addr, "alice").await;
    let (mut ws_bob, _, _, _) = login(&addr, "bob").await;

    send(&mut ws_alice, &ClientEvent::StartParty).await;

    let invite_id = recv_until(&mut ws_bob, |ev| match ev {
        ServerEvent::PartyInvite { invite_id, host } => {
            assert_eq!(host, Username::new("alice"));
            Some(invite_id)
        }
        _ => None,
    })
    .await;

    send(
        &mut ws_bob,
        &ClientEvent::RespondParty {
            invite_id,
            accept: true,
        },
    )
    .await;

    // Alice's home sits at spawn + (40, 40).
    let (username, x, y) = recv_until(&mut ws_alice, |ev| match ev {
        ServerEvent::Teleport { username, x, y } => Some((username, x, y)),
        _ => None,
    })
    .await;
    assert_eq!(username, Username::new("bob"));
    assert_eq!((x, y), (90, 90));
}
