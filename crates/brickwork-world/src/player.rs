//! A player inside a room.

use brickwork_protocol::{PlayerId, PlayerMode, Point, Smiley};
use brickwork_transport::ConnectionId;

/// One player in one room's roster.
///
/// Created when a connection joins or creates a room, destroyed when it
/// leaves or disconnects. Owned exclusively by the room's
/// [`Roster`](crate::Roster); everything else holds at most a transient
/// reference while processing a single message.
#[derive(Debug)]
pub struct Player {
    /// In-room id, unique within the room.
    pub id: PlayerId,
    /// Current position in the roster, rebuilt on every removal.
    pub(crate) index: usize,
    pub username: String,
    /// Hue the player's sprite is tinted with.
    pub tint: u32,
    /// The connection this player belongs to.
    pub conn: ConnectionId,
    /// Simulated state, in room pixel coordinates.
    pub position: Point,
    pub velocity: Point,
    pub movement: Point,
    pub jumping: bool,
    pub mode: PlayerMode,
    pub smiley: Smiley,
}

impl Player {
    /// Creates a player at the given spawn point with default appearance.
    pub fn new(
        id: PlayerId,
        username: String,
        tint: u32,
        conn: ConnectionId,
        spawn: Point,
    ) -> Self {
        Self {
            id,
            index: 0, // assigned by the roster on add
            username,
            tint,
            conn,
            position: spawn,
            velocity: Point::default(),
            movement: Point::default(),
            jumping: false,
            mode: PlayerMode::default(),
            smiley: Smiley::default(),
        }
    }

    /// The player's current roster index.
    pub fn index(&self) -> usize {
        self.index
    }
}
