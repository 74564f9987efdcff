//! Fan-out of encoded messages to one, all, or all-but-one room occupants.

use std::collections::HashMap;

use brickwork_protocol::Message;
use brickwork_transport::{ConnectionId, Outbound};
use brickwork_world::Room;

/// Routes outbound messages to connections' writer channels.
///
/// A message is encoded once per call and the bytes cloned per recipient.
/// Sends to a connection whose writer is gone are dropped silently — the
/// disconnect event that follows cleans up the registration.
#[derive(Debug, Default)]
pub struct Relay {
    connections: HashMap<ConnectionId, Outbound>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an approved connection's outbound channel.
    pub fn register(&mut self, conn: ConnectionId, outbound: Outbound) {
        self.connections.insert(conn, outbound);
    }

    /// Removes a connection. Returns whether it was registered.
    pub fn unregister(&mut self, conn: ConnectionId) -> bool {
        self.connections.remove(&conn).is_some()
    }

    /// Number of registered (approved, live) connections.
    pub fn online(&self) -> u32 {
        self.connections.len() as u32
    }

    /// Sends a message to a single connection.
    pub fn send(&self, msg: &Message, conn: ConnectionId) {
        self.send_bytes(msg.encode(), conn);
    }

    /// Sends a message to every player in a room, including the sender.
    pub fn broadcast(&self, room: &Room, msg: &Message) {
        let bytes = msg.encode();
        for player in room.roster().iter() {
            self.send_bytes(bytes.clone(), player.conn);
        }
    }

    /// Sends a message to every player in a room except one connection.
    pub fn broadcast_except(
        &self,
        room: &Room,
        msg: &Message,
        except: ConnectionId,
    ) {
        let bytes = msg.encode();
        for player in room.roster().iter() {
            if player.conn != except {
                self.send_bytes(bytes.clone(), player.conn);
            }
        }
    }

    fn send_bytes(&self, bytes: Vec<u8>, conn: ConnectionId) {
        if let Some(outbound) = self.connections.get(&conn) {
            let _ = outbound.send(bytes);
        }
    }
}
