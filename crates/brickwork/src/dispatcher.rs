//! The central decision engine: classifies transport events, decodes
//! payloads, and applies the state-mutation + broadcast logic for every
//! message type.
//!
//! A `Dispatcher` owns all mutable server state — the session registry,
//! the room store, the relay, and the connection→room index — and is
//! driven from exactly one task. Handlers are synchronous and run to
//! completion per event, so every mutation-plus-broadcast sequence is
//! atomic from any observer's point of view.
//!
//! Error discipline: nothing a peer sends can crash the loop. Malformed
//! payloads, wrong-state requests, and unknown rooms are dropped with a
//! debug log; the only protocol-visible refusal is a denied handshake.

use std::collections::HashMap;

use brickwork_protocol::{
    truncate_to, Layer, Message, PlayerMode, Point, RequestKind, RoomId,
    Smiley, MAX_CHAT_LENGTH, MAX_ROOM_DESCRIPTION_LENGTH,
    MAX_ROOM_NAME_LENGTH,
};
use brickwork_session::SessionRegistry;
use brickwork_transport::{
    ConnectionId, ConnectionStatus, HandshakeDecision, Outbound, ServerEvent,
};
use brickwork_world::{BlockType, Player, RoomStore};
use tokio::sync::oneshot;

use crate::{Relay, ServerConfig};

/// The single-threaded core of the server. See the module docs.
pub struct Dispatcher {
    config: ServerConfig,
    sessions: SessionRegistry,
    rooms: RoomStore,
    relay: Relay,
    /// Which room each connection's player is in. A connection appears
    /// here exactly while it has a player — the "at most one player per
    /// identity" invariant lives in this map.
    memberships: HashMap<ConnectionId, RoomId>,
}

impl Dispatcher {
    /// Creates a dispatcher with empty registries and the default room.
    pub fn new(config: ServerConfig) -> Self {
        let mut rooms = RoomStore::new(config.max_players);
        rooms.create(
            config.default_room_name.clone(),
            config.default_room_description.clone(),
            config.room_width,
            config.room_height,
        );
        Self {
            config,
            sessions: SessionRegistry::new(),
            rooms,
            relay: Relay::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// The room the connection's player is in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomId> {
        self.memberships.get(&conn).copied()
    }

    /// Processes one transport event to completion.
    pub fn handle(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Handshake {
                conn,
                payload,
                outbound,
                decision,
            } => self.handle_handshake(conn, &payload, outbound, decision),
            ServerEvent::Data { conn, payload } => {
                self.handle_data(conn, &payload);
            }
            ServerEvent::StatusChanged { conn, status } => {
                self.handle_status(conn, status);
            }
        }
    }

    // -- Handshake ---------------------------------------------------------

    fn handle_handshake(
        &mut self,
        conn: ConnectionId,
        payload: &[u8],
        outbound: Outbound,
        decision: oneshot::Sender<HandshakeDecision>,
    ) {
        let verdict = self.screen_login(conn, payload, outbound);
        // The reader task may already be gone; nothing to do then.
        let _ = decision.send(verdict);
    }

    /// Validates a login payload and records the pending login on success.
    fn screen_login(
        &mut self,
        conn: ConnectionId,
        payload: &[u8],
        outbound: Outbound,
    ) -> HandshakeDecision {
        let msg = match Message::decode(payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn, error = %e, "malformed handshake, denying");
                return HandshakeDecision::Deny;
            }
        };
        let (username, color) = match msg {
            Message::Login { username, color } => (username, color),
            other => {
                tracing::debug!(
                    %conn,
                    tag = other.tag(),
                    "handshake is not a login, denying"
                );
                return HandshakeDecision::Deny;
            }
        };

        // One player per identity, server-wide: an identity that already
        // has a player (or a pending login) is denied, never overwritten.
        if self.memberships.contains_key(&conn) {
            tracing::warn!(%conn, "login from a connection that already has a player, denying");
            return HandshakeDecision::Deny;
        }
        match self.sessions.register(conn, &username, color) {
            Ok(()) => {
                tracing::info!(%conn, %username, "login approved");
                self.relay.register(conn, outbound);
                HandshakeDecision::Approve
            }
            Err(e) => {
                tracing::info!(%conn, error = %e, "login denied");
                HandshakeDecision::Deny
            }
        }
    }

    // -- Data --------------------------------------------------------------

    fn handle_data(&mut self, conn: ConnectionId, payload: &[u8]) {
        let msg = match Message::decode(payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn, error = %e, "dropping malformed payload");
                return;
            }
        };
        match msg {
            Message::Request {
                kind: RequestKind::Lobby,
            } => self.send_lobby(conn),
            Message::CreateRoom { name, description } => {
                self.create_room(conn, &name, &description);
            }
            Message::JoinRoom { room } => self.join_room(conn, room),
            Message::PlayerLeave { .. } => self.leave_room(conn),
            Message::PlayerState {
                position,
                velocity,
                movement,
                jumping,
                ..
            } => self.apply_state(conn, position, velocity, movement, jumping),
            Message::Block { x, y, layer, block } => {
                self.place_block(conn, x, y, layer, block);
            }
            Message::Chat { text, .. } => self.chat(conn, &text),
            Message::PlayerSmiley { smiley, .. } => {
                self.change_smiley(conn, smiley);
            }
            Message::PlayerMode { mode, .. } => self.change_mode(conn, mode),

            // Server-outbound types have no meaning as data from a client.
            Message::Login { .. }
            | Message::Lobby { .. }
            | Message::Init { .. }
            | Message::PlayerJoin { .. } => {
                tracing::debug!(
                    %conn,
                    tag = msg.tag(),
                    "dropping client-sent server message"
                );
            }
        }
    }

    /// Replies to the requester — and only the requester — with the lobby
    /// snapshot. Read-only.
    fn send_lobby(&self, conn: ConnectionId) {
        let msg = Message::Lobby {
            server_name: self.config.name.clone(),
            description: self.config.description.clone(),
            intro: self.config.intro.clone(),
            online: self.relay.online(),
            rooms: self.rooms.summaries(),
        };
        self.relay.send(&msg, conn);
    }

    fn create_room(
        &mut self,
        conn: ConnectionId,
        name: &str,
        description: &str,
    ) {
        if self.memberships.contains_key(&conn) {
            tracing::debug!(%conn, "create-room while in a room, dropping");
            return;
        }
        let name = truncate_to(name, MAX_ROOM_NAME_LENGTH).to_owned();
        let description =
            truncate_to(description, MAX_ROOM_DESCRIPTION_LENGTH).to_owned();
        let room_id = self.rooms.create(
            name,
            description,
            self.config.room_width,
            self.config.room_height,
        );
        // A fresh room has no one to announce to or replay from.
        self.enter_room(conn, room_id, false);
    }

    fn join_room(&mut self, conn: ConnectionId, room_id: RoomId) {
        if self.memberships.contains_key(&conn) {
            tracing::debug!(%conn, "join-room while in a room, dropping");
            return;
        }
        self.enter_room(conn, room_id, true);
    }

    /// Puts a connection's player into a room: allocates the in-room id,
    /// consumes the pending login, sends the grid + self-join, and (for
    /// joins into populated rooms) announces and backfills.
    fn enter_room(
        &mut self,
        conn: ConnectionId,
        room_id: RoomId,
        announce: bool,
    ) {
        let room = match self.rooms.get_mut(room_id) {
            Ok(room) => room,
            Err(e) => {
                tracing::debug!(%conn, error = %e, "join for unknown room, dropping");
                return;
            }
        };
        if self.sessions.get(conn).is_none() {
            tracing::debug!(%conn, "room entry without a pending login, dropping");
            return;
        }

        // Allocate before consuming the login: a refused join leaves the
        // connection free to try another room.
        let Some(id) = room.roster().allocate_id() else {
            tracing::warn!(%conn, %room_id, "room is full, refusing entry");
            return;
        };
        let login = self
            .sessions
            .consume(conn)
            .expect("pending login checked above");

        let player =
            Player::new(id, login.username, login.color, conn, room.spawn());
        let username = player.username.clone();
        let tint = player.tint;
        room.roster_mut().add(player);
        self.memberships.insert(conn, room_id);
        tracing::info!(
            %conn,
            %room_id,
            player_id = %id,
            %username,
            "player entered room"
        );

        // The joiner gets the full grid, then its own join confirmation.
        self.relay.send(&room.init_message(), conn);
        self.relay.send(
            &Message::PlayerJoin {
                username: username.clone(),
                id,
                is_self: true,
                tint,
            },
            conn,
        );

        if announce {
            self.relay.broadcast_except(
                room,
                &Message::PlayerJoin {
                    username,
                    id,
                    is_self: false,
                    tint,
                },
                conn,
            );

            // Replay every other occupant so the joiner reconstructs the
            // room from messages alone: identity, position, and any
            // non-default appearance.
            for other in room.roster().iter().filter(|p| p.id != id) {
                self.relay.send(
                    &Message::PlayerJoin {
                        username: other.username.clone(),
                        id: other.id,
                        is_self: false,
                        tint: other.tint,
                    },
                    conn,
                );
                self.relay.send(
                    &Message::PlayerState {
                        id: other.id,
                        position: other.position,
                        velocity: other.velocity,
                        movement: other.movement,
                        jumping: other.jumping,
                    },
                    conn,
                );
                if other.mode != PlayerMode::default() {
                    self.relay.send(
                        &Message::PlayerMode {
                            id: other.id,
                            mode: other.mode,
                        },
                        conn,
                    );
                }
                if other.smiley != Smiley::DEFAULT {
                    self.relay.send(
                        &Message::PlayerSmiley {
                            id: other.id,
                            smiley: other.smiley,
                        },
                        conn,
                    );
                }
            }
        }
    }

    fn leave_room(&mut self, conn: ConnectionId) {
        let Some(room_id) = self.memberships.remove(&conn) else {
            tracing::debug!(%conn, "leave without a room, dropping");
            return;
        };
        self.remove_from_room(conn, room_id, "left room");
    }

    /// Removes a connection's player from a room and tells the remaining
    /// occupants. Shared by explicit leaves and disconnects.
    fn remove_from_room(
        &mut self,
        conn: ConnectionId,
        room_id: RoomId,
        reason: &'static str,
    ) {
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };
        let Some(id) = room.roster().by_connection(conn).map(|p| p.id)
        else {
            tracing::error!(%conn, %room_id, "membership without a rostered player");
            return;
        };

        // remove() rebuilds every remaining roster index before we
        // broadcast anything that could reference roster order.
        let player = room
            .roster_mut()
            .remove(id)
            .expect("player id was just resolved");
        tracing::info!(
            %conn,
            %room_id,
            player_id = %id,
            username = %player.username,
            reason,
            "player removed from room"
        );

        self.relay.broadcast(room, &Message::PlayerLeave { id });
    }

    fn apply_state(
        &mut self,
        conn: ConnectionId,
        position: Point,
        velocity: Point,
        movement: Point,
        jumping: bool,
    ) {
        let Some(&room_id) = self.memberships.get(&conn) else {
            tracing::debug!(%conn, "state update without a room, dropping");
            return;
        };
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };

        let position = room.clamp_position(position);
        let Some(player) = room.roster_mut().by_connection_mut(conn) else {
            tracing::error!(%conn, %room_id, "membership without a rostered player");
            return;
        };
        let id = player.id;
        player.position = position;
        player.velocity = velocity;
        player.movement = movement;
        player.jumping = jumping;

        self.relay.broadcast_except(
            room,
            &Message::PlayerState {
                id,
                position,
                velocity,
                movement,
                jumping,
            },
            conn,
        );
    }

    fn place_block(
        &mut self,
        conn: ConnectionId,
        x: u16,
        y: u16,
        layer: Layer,
        block_id: u8,
    ) {
        let Some(&room_id) = self.memberships.get(&conn) else {
            tracing::debug!(%conn, "block placement without a room, dropping");
            return;
        };
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };
        let Some(block) = BlockType::from_id(block_id) else {
            tracing::debug!(%conn, block_id, "unknown block id, dropping");
            return;
        };

        // In bounds and actually changing the cell, or nothing happens —
        // including no acknowledgment to the sender.
        if room.grid_mut().place(x, y, layer, block) {
            self.relay.broadcast(
                room,
                &Message::Block {
                    x,
                    y,
                    layer,
                    block: block.id,
                },
            );
        }
    }

    fn chat(&mut self, conn: ConnectionId, text: &str) {
        let Some(&room_id) = self.memberships.get(&conn) else {
            tracing::debug!(%conn, "chat without a room, dropping");
            return;
        };
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };
        let Some(id) = room.roster().by_connection(conn).map(|p| p.id)
        else {
            tracing::error!(%conn, %room_id, "membership without a rostered player");
            return;
        };

        let text = truncate_to(text, MAX_CHAT_LENGTH).to_owned();
        self.relay.broadcast_except(
            room,
            &Message::Chat { id, text },
            conn,
        );
    }

    fn change_smiley(&mut self, conn: ConnectionId, smiley: Smiley) {
        let Some(&room_id) = self.memberships.get(&conn) else {
            tracing::debug!(%conn, "smiley change without a room, dropping");
            return;
        };
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };
        let Some(player) = room.roster_mut().by_connection_mut(conn) else {
            tracing::error!(%conn, %room_id, "membership without a rostered player");
            return;
        };
        if player.smiley == smiley {
            return;
        }
        player.smiley = smiley;
        let id = player.id;

        self.relay.broadcast_except(
            room,
            &Message::PlayerSmiley { id, smiley },
            conn,
        );
    }

    fn change_mode(&mut self, conn: ConnectionId, mode: PlayerMode) {
        let Some(&room_id) = self.memberships.get(&conn) else {
            tracing::debug!(%conn, "mode change without a room, dropping");
            return;
        };
        let Ok(room) = self.rooms.get_mut(room_id) else {
            tracing::error!(%conn, %room_id, "membership points at a missing room");
            return;
        };
        let Some(player) = room.roster_mut().by_connection_mut(conn) else {
            tracing::error!(%conn, %room_id, "membership without a rostered player");
            return;
        };
        if player.mode == mode {
            return;
        }
        player.mode = mode;
        let id = player.id;

        self.relay.broadcast_except(
            room,
            &Message::PlayerMode { id, mode },
            conn,
        );
    }

    // -- Status ------------------------------------------------------------

    fn handle_status(&mut self, conn: ConnectionId, status: ConnectionStatus) {
        match status {
            ConnectionStatus::Connected => {
                match self.sessions.get(conn) {
                    Some(login) => {
                        tracing::info!(
                            %conn,
                            username = %login.username,
                            "connection established"
                        );
                    }
                    None => {
                        // Connected fires only after an approved login;
                        // missing state here is a logic bug, not peer input.
                        tracing::error!(%conn, "connected status for unknown connection");
                    }
                }
            }
            ConnectionStatus::Disconnected => {
                let had_room =
                    if let Some(room_id) = self.memberships.remove(&conn) {
                        self.remove_from_room(conn, room_id, "disconnected");
                        true
                    } else {
                        false
                    };
                let had_login = self.sessions.remove(conn);
                let had_channel = self.relay.unregister(conn);

                if had_room || had_login {
                    tracing::info!(%conn, "disconnected");
                } else if !had_channel {
                    tracing::error!(%conn, "disconnect for connection with no recorded state");
                }
            }
        }
    }
}
