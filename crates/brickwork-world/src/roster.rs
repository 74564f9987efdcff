//! The per-room player registry.

use brickwork_protocol::PlayerId;
use brickwork_transport::ConnectionId;

use crate::Player;

/// An ordered roster of the players in one room.
///
/// Invariants maintained here:
/// - no two players share an in-room id, and every id is below
///   `max_players`;
/// - every player's roster index equals its current position in the list,
///   restored synchronously on every removal before anything referencing
///   roster order can observe it.
#[derive(Debug)]
pub struct Roster {
    players: Vec<Player>,
    max_players: usize,
}

impl Roster {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::new(),
            max_players,
        }
    }

    /// Finds the lowest in-room id not currently in use.
    ///
    /// A linear scan over `0..max_players`; rooms are small enough that a
    /// free list would not pay for itself. Returns `None` when the room is
    /// full.
    pub fn allocate_id(&self) -> Option<PlayerId> {
        (0..self.max_players)
            .map(|id| PlayerId(id as u8))
            .find(|id| !self.players.iter().any(|p| p.id == *id))
    }

    /// Appends a player to the roster, assigning its roster index.
    pub fn add(&mut self, mut player: Player) -> &Player {
        debug_assert!(self.players.len() < self.max_players);
        debug_assert!(self.players.iter().all(|p| p.id != player.id));
        player.index = self.players.len();
        self.players.push(player);
        &self.players[self.players.len() - 1]
    }

    /// Removes a player by id and rebuilds every remaining player's roster
    /// index. The rebuild happens here, atomically with the removal, so no
    /// caller ever observes a stale index.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let pos = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(pos);
        for (i, p) in self.players.iter_mut().enumerate() {
            p.index = i;
        }
        Some(player)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The player owned by the given connection, if any.
    pub fn by_connection(&self, conn: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.conn == conn)
    }

    pub fn by_connection_mut(
        &mut self,
        conn: ConnectionId,
    ) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.conn == conn)
    }

    /// Iterates players in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }
}

// =========================================================================
// Tests
// =========================================================================
