//! WebSocket listener built on `tokio-tungstenite`.
//!
//! Each accepted socket gets a reader task (this module) and a writer task
//! draining the connection's outbound channel. One binary WebSocket frame
//! carries exactly one protocol payload; the first frame on a connection is
//! its handshake and is held until the dispatcher approves or denies it.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::{
    ConnectionId, ConnectionStatus, EventSender, HandshakeDecision,
    ServerEvent, TransportError,
};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket listener that turns sockets into dispatcher events.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds the listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop forever, spawning a task per connection.
    ///
    /// Failed accepts are logged and skipped; a single bad socket never
    /// stops the listener.
    pub async fn run(self, events: EventSender) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let conn = ConnectionId::new(
                        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
                    );
                    tracing::debug!(%conn, %addr, "accepted connection");
                    let events = events.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            drive_connection(stream, conn, events).await
                        {
                            tracing::debug!(
                                %conn,
                                error = %e,
                                "connection task ended with error"
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

/// Reads the next payload-bearing frame. `None` means the peer closed.
async fn next_payload(
    stream: &mut SplitStream<WsStream>,
) -> Result<Option<Vec<u8>>, TransportError> {
    loop {
        match stream.next().await {
            Some(Ok(WsMessage::Binary(data))) => {
                return Ok(Some(data.into()));
            }
            Some(Ok(WsMessage::Close(_))) | None => return Ok(None),
            Some(Ok(_)) => continue, // ping/pong/text/frame
            Some(Err(e)) => {
                return Err(TransportError::ReceiveFailed(
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    ),
                ));
            }
        }
    }
}

/// Drains a connection's outbound channel into its socket sink.
///
/// Ends when every outbound sender is dropped (the dispatcher unregistered
/// the connection) or the peer stops accepting writes.
async fn write_outbound(
    mut sink: SplitSink<WsStream, WsMessage>,
    mut outbound_rx: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    while let Some(bytes) = outbound_rx.recv().await {
        if sink.send(WsMessage::Binary(bytes.into())).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
}

/// Handles one connection from WebSocket upgrade to close.
async fn drive_connection(
    stream: TcpStream,
    conn: ConnectionId,
    events: EventSender,
) -> Result<(), TransportError> {
    let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
        TransportError::AcceptFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            e,
        ))
    })?;
    let (sink, mut stream) = ws.split();

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_outbound(sink, outbound_rx));

    // Connection approval: the first frame is the handshake. The peer is
    // not Connected until the dispatcher approves it.
    let Some(payload) = next_payload(&mut stream).await? else {
        return Ok(()); // closed before sending anything
    };

    let (decision_tx, decision_rx) = oneshot::channel();
    events
        .send(ServerEvent::Handshake {
            conn,
            payload,
            outbound: outbound_tx.clone(),
            decision: decision_tx,
        })
        .map_err(|_| TransportError::EventChannelClosed)?;

    match decision_rx.await {
        Ok(HandshakeDecision::Approve) => {}
        Ok(HandshakeDecision::Deny) | Err(_) => {
            tracing::debug!(%conn, "handshake denied, closing");
            return Ok(());
        }
    }

    let _ = events.send(ServerEvent::StatusChanged {
        conn,
        status: ConnectionStatus::Connected,
    });

    // Data loop. Whatever ends it — clean close or a read error — the
    // dispatcher must still see the disconnect.
    let result = pump_data(conn, &mut stream, &events).await;

    let _ = events.send(ServerEvent::StatusChanged {
        conn,
        status: ConnectionStatus::Disconnected,
    });

    result
}

/// Forwards data frames to the dispatcher until the peer goes away.
async fn pump_data(
    conn: ConnectionId,
    stream: &mut SplitStream<WsStream>,
    events: &EventSender,
) -> Result<(), TransportError> {
    while let Some(payload) = next_payload(stream).await? {
        events
            .send(ServerEvent::Data { conn, payload })
            .map_err(|_| TransportError::EventChannelClosed)?;
    }
    Ok(())
}
