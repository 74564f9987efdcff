//! The registry of connections that have logged in but not yet entered a
//! room.

use std::collections::HashMap;

use brickwork_protocol::{truncate_to, MAX_USERNAME_LENGTH};
use brickwork_transport::ConnectionId;

use crate::SessionError;

/// Credentials held between handshake approval and room entry.
///
/// Consumed when the connection joins or creates a room; discarded if it
/// disconnects first. A `PendingLogin` exists for a connection only while
/// that connection has no player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub username: String,
    /// Hue the player's sprite is tinted with.
    pub color: u32,
}

/// Tracks every connection's pending login, keyed by connection identity.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    pending: HashMap<ConnectionId, PendingLogin>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending login for a connection.
    ///
    /// The username is truncated to [`MAX_USERNAME_LENGTH`] characters.
    ///
    /// # Errors
    /// Returns [`SessionError::Duplicate`] if the connection already has a
    /// pending login; the existing entry is left untouched.
    pub fn register(
        &mut self,
        conn: ConnectionId,
        username: &str,
        color: u32,
    ) -> Result<(), SessionError> {
        if self.pending.contains_key(&conn) {
            return Err(SessionError::Duplicate(conn));
        }
        let username = truncate_to(username, MAX_USERNAME_LENGTH).to_owned();
        tracing::debug!(%conn, %username, "pending login recorded");
        self.pending.insert(conn, PendingLogin { username, color });
        Ok(())
    }

    /// Removes and returns the pending login for a connection, if any.
    /// Called when the connection enters a room.
    pub fn consume(&mut self, conn: ConnectionId) -> Option<PendingLogin> {
        self.pending.remove(&conn)
    }

    /// Discards the pending login for a connection, if any. Called on
    /// disconnect before room entry. Returns whether an entry existed.
    pub fn remove(&mut self, conn: ConnectionId) -> bool {
        self.pending.remove(&conn).is_some()
    }

    /// Returns the pending login for a connection without removing it.
    pub fn get(&self, conn: ConnectionId) -> Option<&PendingLogin> {
        self.pending.get(&conn)
    }

    /// Returns `true` if the connection has a pending login.
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.pending.contains_key(&conn)
    }

    /// Number of pending logins.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no logins are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_register_new_connection_stores_login() {
        let mut reg = SessionRegistry::new();

        reg.register(conn(1), "alice", 40).expect("should succeed");

        let login = reg.get(conn(1)).expect("login should exist");
        assert_eq!(login.username, "alice");
        assert_eq!(login.color, 40);
    }

    #[test]
    fn test_register_duplicate_rejected_and_original_kept() {
        // A second handshake on the same connection must be denied and the
        // first login must remain exactly as registered.
        let mut reg = SessionRegistry::new();
        reg.register(conn(1), "alice", 40).unwrap();

        let result = reg.register(conn(1), "mallory", 99);

        assert!(matches!(
            result,
            Err(SessionError::Duplicate(c)) if c == conn(1)
        ));
        let login = reg.get(conn(1)).unwrap();
        assert_eq!(login.username, "alice");
        assert_eq!(login.color, 40);
    }

    #[test]
    fn test_register_truncates_long_username() {
        let mut reg = SessionRegistry::new();
        let long = "a".repeat(MAX_USERNAME_LENGTH + 5);

        reg.register(conn(1), &long, 0).unwrap();

        assert_eq!(
            reg.get(conn(1)).unwrap().username.chars().count(),
            MAX_USERNAME_LENGTH
        );
    }

    #[test]
    fn test_consume_removes_the_login() {
        let mut reg = SessionRegistry::new();
        reg.register(conn(1), "alice", 40).unwrap();

        let login = reg.consume(conn(1)).expect("should return the login");

        assert_eq!(login.username, "alice");
        assert!(!reg.contains(conn(1)));
        assert!(reg.consume(conn(1)).is_none());
    }

    #[test]
    fn test_remove_unknown_connection_returns_false() {
        let mut reg = SessionRegistry::new();
        assert!(!reg.remove(conn(9)));
    }

    #[test]
    fn test_remove_discards_without_returning() {
        let mut reg = SessionRegistry::new();
        reg.register(conn(1), "alice", 40).unwrap();

        assert!(reg.remove(conn(1)));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_independent_connections_do_not_collide() {
        let mut reg = SessionRegistry::new();
        reg.register(conn(1), "alice", 1).unwrap();
        reg.register(conn(2), "bob", 2).unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(conn(1)).unwrap().username, "alice");
        assert_eq!(reg.get(conn(2)).unwrap().username, "bob");
    }
}
