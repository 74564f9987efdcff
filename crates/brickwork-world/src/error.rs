//! Error types for the world layer.

use brickwork_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No room exists with the given id.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// Every in-room id is taken; the join is refused.
    #[error("room {0} is full")]
    RoomFull(RoomId),
}
