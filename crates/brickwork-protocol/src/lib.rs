//! Wire protocol for Brickwork.
//!
//! Defines the closed set of message types that travel between server and
//! client ([`Message`]) and their binary encoding. Every message is a tag
//! byte followed by a fixed little-endian payload layout; see [`codec`] for
//! the per-type layouts.
//!
//! This crate is a leaf — it knows nothing about rooms, sessions, or the
//! transport. Both sides of the wire depend on it and nothing else, which is
//! what keeps the byte layouts in one place.

mod codec;
mod error;
mod types;

pub use error::ProtocolError;
pub use types::{
    truncate_to, Layer, Message, PlayerId, PlayerMode, Point, RequestKind,
    RoomId, RoomSummary, Smiley, MAX_CHAT_LENGTH,
    MAX_ROOM_DESCRIPTION_LENGTH, MAX_ROOM_NAME_LENGTH, MAX_USERNAME_LENGTH,
};
