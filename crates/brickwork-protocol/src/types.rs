//! Core protocol types: identities, enumerations, and the message set.

use std::fmt;

/// Maximum length of a chat message; longer text is truncated server-side
/// before rebroadcast.
pub const MAX_CHAT_LENGTH: usize = 80;

/// Maximum length of a room name.
pub const MAX_ROOM_NAME_LENGTH: usize = 20;

/// Maximum length of a room description.
pub const MAX_ROOM_DESCRIPTION_LENGTH: usize = 80;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Returns `s` cut down to at most `max_chars` characters, on a character
/// boundary. Used wherever the protocol caps a client-supplied string
/// (chat text, usernames, room names and descriptions).
pub fn truncate_to(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// A player's in-room id.
///
/// Unique within a single room at all times and reused after a player
/// leaves. Distinct from the roster index, which is the player's current
/// position in the room's player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room's unique id, assigned monotonically at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A 2D point in room pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One of the two tile layers of a room grid.
///
/// The wire value doubles as the grid layer index, so `Background` must
/// stay 0 and `Foreground` 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Layer {
    Background = 0,
    Foreground = 1,
}

impl Layer {
    /// The number of layers in every room grid.
    pub const COUNT: usize = 2;

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            1 => Some(Self::Foreground),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// A player's selected smiley face.
///
/// The full set of faces is client art; the server only needs the raw value
/// and the knowledge of which one is the default (not replayed to joiners).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Smiley(pub u8);

impl Smiley {
    pub const DEFAULT: Smiley = Smiley(0);
}

/// A player's appearance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PlayerMode {
    #[default]
    Normal = 0,
    God = 1,
}

impl PlayerMode {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::God),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// What a `Request` message is asking the server to send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestKind {
    /// The lobby snapshot: server info plus one entry per room.
    Lobby = 0,
}

impl RequestKind {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Lobby),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// One room's entry in the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    /// Number of players currently in the room.
    pub players: u8,
    pub rating: u8,
}

/// Every message that travels on the wire, in either direction.
///
/// Decoded messages are immutable values; the dispatcher constructs fresh
/// ones for anything it sends. Client-supplied `id` fields are untrusted and
/// overwritten with the sender's real id before rebroadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Handshake credentials. Only valid as the connection-approval payload,
    /// never as a data message.
    Login { username: String, color: u32 },

    /// Client asks the server to send something back, e.g. the lobby.
    Request { kind: RequestKind },

    /// Server → client lobby snapshot.
    Lobby {
        server_name: String,
        description: String,
        intro: String,
        /// Total connections currently on the server.
        online: u32,
        rooms: Vec<RoomSummary>,
    },

    /// Server → client room initialization: dimensions plus the full tile
    /// grid, one block id per tile, background layer first, rows in order.
    Init {
        width: u16,
        height: u16,
        /// `width * height * 2` block ids, layer-major then row-major.
        blocks: Vec<u8>,
    },

    /// Client asks to create (and immediately enter) a new room.
    CreateRoom { name: String, description: String },

    /// Client asks to enter an existing room.
    JoinRoom { room: RoomId },

    /// A player entered the room. `is_self` marks the copy echoed to the
    /// joiner itself.
    PlayerJoin {
        username: String,
        id: PlayerId,
        is_self: bool,
        tint: u32,
    },

    /// A player left the room (or disconnected).
    PlayerLeave { id: PlayerId },

    /// A movement update: full simulated state for one player.
    PlayerState {
        id: PlayerId,
        position: Point,
        velocity: Point,
        movement: Point,
        jumping: bool,
    },

    /// A block placement at (x, y) on the given layer.
    Block {
        x: u16,
        y: u16,
        layer: Layer,
        block: u8,
    },

    /// A chat line.
    Chat { id: PlayerId, text: String },

    /// A player changed their smiley.
    PlayerSmiley { id: PlayerId, smiley: Smiley },

    /// A player changed their mode.
    PlayerMode { id: PlayerId, mode: PlayerMode },
}
