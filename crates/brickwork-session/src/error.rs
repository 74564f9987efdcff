//! Error types for the session layer.

use brickwork_transport::ConnectionId;

/// Errors that can occur during session registration.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A pending login already exists for this connection. The handshake
    /// must be denied; an existing login is never overwritten.
    #[error("connection {0} already has a pending login")]
    Duplicate(ConnectionId),
}
