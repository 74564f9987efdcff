//! Events delivered from the transport to the dispatch loop.

use tokio::sync::{mpsc, oneshot};

use crate::ConnectionId;

/// Channel sender for delivering encoded payloads to one connection's
/// writer task. Sending to a closed channel means the peer is gone; callers
/// drop the payload silently.
pub type Outbound = mpsc::UnboundedSender<Vec<u8>>;

/// Channel sender the transport uses to feed the dispatch loop.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// The dispatcher's verdict on a connection-approval handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeDecision {
    /// Credentials recorded; the connection may start sending data.
    Approve,
    /// The connection is refused and closed before any data is read.
    Deny,
}

/// Connection lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The handshake was approved and the connection is live.
    Connected,
    /// The peer closed the connection or the link failed.
    Disconnected,
}

/// One discrete event from the transport.
///
/// Events for a single connection arrive in order: exactly one `Handshake`
/// first, then zero or more `Data`, then a final `Disconnected` status (only
/// if the handshake was approved).
pub enum ServerEvent {
    /// The connection's first message, carrying login credentials. The
    /// transport blocks the connection until `decision` is answered; `Deny`
    /// closes the socket.
    Handshake {
        conn: ConnectionId,
        payload: Vec<u8>,
        /// Where the dispatcher sends this connection's outbound bytes once
        /// approved.
        outbound: Outbound,
        decision: oneshot::Sender<HandshakeDecision>,
    },

    /// A data message from an approved connection.
    Data {
        conn: ConnectionId,
        payload: Vec<u8>,
    },

    /// The connection's status changed.
    StatusChanged {
        conn: ConnectionId,
        status: ConnectionStatus,
    },
}
