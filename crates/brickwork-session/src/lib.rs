//! Pending-login tracking for Brickwork.
//!
//! Between the approval of a connection's handshake and its entry into a
//! room, the only state the server holds for it is a [`PendingLogin`]: the
//! username and color it presented. This crate owns that window.
//!
//! # Concurrency note
//!
//! [`SessionRegistry`] is a plain `HashMap` and is not thread-safe by
//! itself. That is intentional: it is owned by the single dispatch task,
//! which is the only mutator of server state. Keeping it simple here avoids
//! hidden locking.

mod error;
mod registry;

pub use error::SessionError;
pub use registry::{PendingLogin, SessionRegistry};
