//! End-to-end tests over real WebSocket connections.
//!
//! These boot a full server on a random port and talk to it with
//! tokio-tungstenite clients, exercising the whole stack: transport →
//! codec → dispatcher → relay → transport.

use std::time::Duration;

use brickwork::{Server, ServerConfig};
use brickwork_protocol::{Layer, Message, PlayerId, Point, RoomId};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as WsMessage;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start() -> String {
    let server = Server::builder().bind("127.0.0.1:0").build().await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");
    ws
}

async fn send(ws: &mut Ws, msg: &Message) {
    ws.send(WsMessage::Binary(msg.encode().into())).await.unwrap();
}

/// Receives the next protocol message, failing the test after 2 seconds.
async fn recv(ws: &mut Ws) -> Message {
    let frame = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await.expect("stream should not end") {
                Ok(WsMessage::Binary(data)) => return data,
                Ok(_) => continue,
                Err(e) => panic!("websocket error: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a message");
    Message::decode(&frame).expect("server sent malformed bytes")
}

/// Logs in and joins the default room, consuming the entry traffic
/// (init, self-join, and any backfill).
async fn login_and_join(ws: &mut Ws, username: &str) -> PlayerId {
    send(
        ws,
        &Message::Login {
            username: username.into(),
            color: 40,
        },
    )
    .await;
    send(ws, &Message::JoinRoom { room: RoomId(0) })
        .await;

    let Message::Init { .. } = recv(ws).await else {
        panic!("expected the grid first");
    };
    let Message::PlayerJoin { id, is_self: true, .. } = recv(ws).await
    else {
        panic!("expected the self-join confirmation");
    };

    id
}

#[tokio::test]
async fn test_two_clients_share_a_room() {
    let addr = start().await;

    let mut alice = connect(&addr).await;
    let alice_id = login_and_join(&mut alice, "alice").await;

    let mut bob = connect(&addr).await;
    send(
        &mut bob,
        &Message::Login {
            username: "bob".into(),
            color: 120,
        },
    )
    .await;
    send(
        &mut bob,
        &Message::JoinRoom {
            room: RoomId(0),
        },
    )
    .await;

    // Bob gets grid, self-join, then the replay of Alice.
    assert!(matches!(recv(&mut bob).await, Message::Init { .. }));
    let Message::PlayerJoin {
        id: bob_id,
        is_self: true,
        ..
    } = recv(&mut bob).await
    else {
        panic!("expected bob's self-join");
    };
    let Message::PlayerJoin {
        username, id, is_self: false, ..
    } = recv(&mut bob).await
    else {
        panic!("expected the replay of alice");
    };
    assert_eq!(username, "alice");
    assert_eq!(id, alice_id);
    assert!(matches!(recv(&mut bob).await, Message::PlayerState { .. }));

    // Alice hears about Bob exactly once.
    let Message::PlayerJoin {
        username,
        id,
        is_self: false,
        ..
    } = recv(&mut alice).await
    else {
        panic!("expected the join announcement");
    };
    assert_eq!(username, "bob");
    assert_eq!(id, bob_id);
}

#[tokio::test]
async fn test_movement_is_clamped_on_the_wire() {
    let addr = start().await;

    let mut alice = connect(&addr).await;
    let alice_id = login_and_join(&mut alice, "alice").await;

    let mut bob = connect(&addr).await;
    login_and_join(&mut bob, "bob").await;
    // Bob consumes the replay of alice; alice consumes bob's announcement.
    assert!(matches!(recv(&mut bob).await, Message::PlayerJoin { .. }));
    assert!(matches!(recv(&mut bob).await, Message::PlayerState { .. }));
    assert!(matches!(recv(&mut alice).await, Message::PlayerJoin { .. }));

    // Alice reports a position far outside the 200x100-tile room.
    send(
        &mut alice,
        &Message::PlayerState {
            id: alice_id,
            position: Point::new(500_000, 500_000),
            velocity: Point::new(0, 0),
            movement: Point::new(0, 0),
            jumping: false,
        },
    )
    .await;

    let Message::PlayerState { id, position, .. } = recv(&mut bob).await
    else {
        panic!("expected a state broadcast");
    };
    assert_eq!(id, alice_id);
    assert_eq!(position, Point::new(3168, 1568), "bob sees the clamp");
}

#[tokio::test]
async fn test_block_edits_propagate_to_all_clients() {
    let addr = start().await;

    let mut alice = connect(&addr).await;
    login_and_join(&mut alice, "alice").await;
    let mut bob = connect(&addr).await;
    login_and_join(&mut bob, "bob").await;
    assert!(matches!(recv(&mut bob).await, Message::PlayerJoin { .. }));
    assert!(matches!(recv(&mut bob).await, Message::PlayerState { .. }));
    assert!(matches!(recv(&mut alice).await, Message::PlayerJoin { .. }));

    let placement = Message::Block {
        x: 10,
        y: 20,
        layer: Layer::Foreground,
        block: 4,
    };
    send(&mut alice, &placement).await;

    assert_eq!(recv(&mut alice).await, placement);
    assert_eq!(recv(&mut bob).await, placement);
}

#[tokio::test]
async fn test_login_resent_as_data_is_ignored() {
    let addr = start().await;

    let mut alice = connect(&addr).await;
    send(
        &mut alice,
        &Message::Login {
            username: "alice".into(),
            color: 40,
        },
    )
    .await;
    // Only the first frame is a handshake; a repeated Login arrives as
    // data and is dropped without disturbing the session.
    send(
        &mut alice,
        &Message::Login {
            username: "alice".into(),
            color: 40,
        },
    )
    .await;

    send(
        &mut alice,
        &Message::JoinRoom {
            room: RoomId(0),
        },
    )
    .await;
    assert!(matches!(recv(&mut alice).await, Message::Init { .. }));
}

#[tokio::test]
async fn test_disconnect_broadcasts_leave() {
    let addr = start().await;

    let mut alice = connect(&addr).await;
    login_and_join(&mut alice, "alice").await;
    let mut bob = connect(&addr).await;
    let bob_id = login_and_join(&mut bob, "bob").await;
    assert!(matches!(recv(&mut alice).await, Message::PlayerJoin { .. }));

    bob.close(None).await.unwrap();

    assert_eq!(
        recv(&mut alice).await,
        Message::PlayerLeave { id: bob_id }
    );
}
