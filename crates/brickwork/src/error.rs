//! Unified error type for the Brickwork server.

use brickwork_protocol::ProtocolError;
use brickwork_session::SessionError;
use brickwork_transport::TransportError;
use brickwork_world::WorldError;

use crate::config::ConfigError;

/// Top-level error wrapping every layer's error type.
///
/// The `#[from]` attributes generate `From` impls so `?` converts layer
/// errors automatically. Note that most layer errors never reach this type
/// at runtime: protocol violations and lookup misses are handled inside the
/// dispatch loop (drop and log), so `BrickworkError` mostly surfaces from
/// startup paths.
#[derive(Debug, thiserror::Error)]
pub enum BrickworkError {
    /// A transport-level error (bind, accept, socket I/O).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (duplicate login).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A world-level error (room lookup, room full).
    #[error(transparent)]
    World(#[from] WorldError),

    /// A configuration loading error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
