//! Transport boundary for Brickwork.
//!
//! The dispatch core never touches sockets. It consumes a stream of
//! [`ServerEvent`]s delivered over a channel and answers handshakes through
//! a oneshot [`HandshakeDecision`]. Outbound traffic goes the other way:
//! each approved connection hands the dispatcher an [`Outbound`] sender of
//! pre-encoded payload bytes, drained by a per-connection writer task.
//!
//! [`WebSocketListener`] is the production implementation; tests drive the
//! dispatcher by constructing events directly.

mod error;
mod event;
mod websocket;

pub use error::TransportError;
pub use event::{
    ConnectionStatus, EventSender, HandshakeDecision, Outbound, ServerEvent,
};
pub use websocket::WebSocketListener;

use std::fmt;

/// Opaque identifier for a physical connection, assigned by the transport
/// and stable for the connection's lifetime. This is the join key between
/// the session registry and the player rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "alice");
        map.insert(ConnectionId::new(2), "bob");
        assert_eq!(map[&ConnectionId::new(1)], "alice");
    }
}
