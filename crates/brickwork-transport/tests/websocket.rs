//! Integration tests for the WebSocket listener.
//!
//! These spin up a real listener and a tokio-tungstenite client and verify
//! the event sequence a connection produces: one Handshake (held for the
//! approve/deny decision), then Data frames, then a Disconnected status.

use brickwork_transport::{
    ConnectionStatus, HandshakeDecision, ServerEvent, WebSocketListener,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Binds a listener on a random port, starts its accept loop, and returns
/// the event receiver plus a connected client.
async fn listener_with_client(
) -> (mpsc::UnboundedReceiver<ServerEvent>, ClientWs) {
    let listener = WebSocketListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(listener.run(events_tx));

    let url = format!("ws://{addr}");
    let (client, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("client should connect");
    (events_rx, client)
}

#[tokio::test]
async fn test_handshake_then_data_then_disconnect_event_order() {
    let (mut events, mut client) = listener_with_client().await;

    // First frame is delivered as the handshake.
    client
        .send(WsMessage::Binary(b"login-bytes".to_vec().into()))
        .await
        .unwrap();

    let (conn, outbound) = match events.recv().await.expect("event") {
        ServerEvent::Handshake {
            conn,
            payload,
            outbound,
            decision,
        } => {
            assert_eq!(payload, b"login-bytes");
            decision.send(HandshakeDecision::Approve).unwrap();
            (conn, outbound)
        }
        _ => panic!("expected Handshake first"),
    };

    match events.recv().await.expect("event") {
        ServerEvent::StatusChanged { conn: c, status } => {
            assert_eq!(c, conn);
            assert_eq!(status, ConnectionStatus::Connected);
        }
        _ => panic!("expected Connected status after approval"),
    }

    // Subsequent frames arrive as Data, in order.
    client
        .send(WsMessage::Binary(b"first".to_vec().into()))
        .await
        .unwrap();
    client
        .send(WsMessage::Binary(b"second".to_vec().into()))
        .await
        .unwrap();

    for expected in [b"first".as_slice(), b"second".as_slice()] {
        match events.recv().await.expect("event") {
            ServerEvent::Data { conn: c, payload } => {
                assert_eq!(c, conn);
                assert_eq!(payload, expected);
            }
            _ => panic!("expected Data"),
        }
    }

    // Outbound bytes reach the client as one binary frame.
    outbound.send(b"from-server".to_vec()).unwrap();
    let frame = client.next().await.unwrap().unwrap();
    assert_eq!(frame.into_data().as_ref(), b"from-server");

    // Closing the client yields a Disconnected status.
    client.send(WsMessage::Close(None)).await.unwrap();
    match events.recv().await.expect("event") {
        ServerEvent::StatusChanged { conn: c, status } => {
            assert_eq!(c, conn);
            assert_eq!(status, ConnectionStatus::Disconnected);
        }
        _ => panic!("expected Disconnected status"),
    }
}

#[tokio::test]
async fn test_denied_handshake_closes_without_further_events() {
    let (mut events, mut client) = listener_with_client().await;

    client
        .send(WsMessage::Binary(b"bad-login".to_vec().into()))
        .await
        .unwrap();

    match events.recv().await.expect("event") {
        ServerEvent::Handshake { decision, .. } => {
            decision.send(HandshakeDecision::Deny).unwrap();
        }
        _ => panic!("expected Handshake"),
    }

    // The server closes the socket; the client sees the stream end.
    loop {
        match client.next().await {
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }

    // A denied connection was never Connected, so no status event follows.
    let extra = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        events.recv(),
    )
    .await;
    assert!(
        extra.is_err(),
        "no events should follow a denied handshake"
    );
}

#[tokio::test]
async fn test_close_before_handshake_produces_no_events() {
    let (mut events, mut client) = listener_with_client().await;

    client.send(WsMessage::Close(None)).await.unwrap();

    let extra = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        events.recv(),
    )
    .await;
    assert!(
        extra.is_err(),
        "a connection that never handshakes produces no events"
    );
}
