//! Binary encoding of [`Message`].
//!
//! Every encoded message is one tag byte followed by that type's payload.
//! All integers are little-endian. Strings are a u16 length prefix followed
//! by UTF-8 bytes. Booleans are one byte, exactly 0 or 1.
//!
//! Layouts per tag:
//!
//! ```text
//!  0 Login        username:str  color:u32
//!  1 Request      kind:u8
//!  2 Lobby        name:str  description:str  intro:str  online:u32
//!                 count:u16  { id:u32  name:str  description:str
//!                              players:u8  rating:u8 } * count
//!  3 Init         width:u16  height:u16  block ids, one byte per tile:
//!                 background layer rows first, then foreground rows
//!  4 CreateRoom   name:str  description:str
//!  5 JoinRoom     room:u32
//!  6 PlayerJoin   username:str  id:u8  is_self:bool  tint:u32
//!  7 PlayerLeave  id:u8
//!  8 PlayerState  id:u8  pos:2*i32  vel:2*i32  move:2*i32  jumping:bool
//!  9 Block        x:u16  y:u16  layer:u8  block:u8
//! 10 Chat         id:u8  text:str
//! 11 PlayerSmiley id:u8  smiley:u8
//! 12 PlayerMode   id:u8  mode:u8
//! ```
//!
//! `decode` and `encode` are exact inverses: decoding rejects trailing
//! bytes and non-canonical booleans, so every accepted byte string
//! re-encodes to itself.

use crate::error::ProtocolError;
use crate::types::{
    Layer, Message, PlayerId, PlayerMode, Point, RequestKind, RoomId,
    RoomSummary, Smiley,
};

mod tag {
    pub const LOGIN: u8 = 0;
    pub const REQUEST: u8 = 1;
    pub const LOBBY: u8 = 2;
    pub const INIT: u8 = 3;
    pub const CREATE_ROOM: u8 = 4;
    pub const JOIN_ROOM: u8 = 5;
    pub const PLAYER_JOIN: u8 = 6;
    pub const PLAYER_LEAVE: u8 = 7;
    pub const PLAYER_STATE: u8 = 8;
    pub const BLOCK: u8 = 9;
    pub const CHAT: u8 = 10;
    pub const PLAYER_SMILEY: u8 = 11;
    pub const PLAYER_MODE: u8 = 12;
}

// ---------------------------------------------------------------------------
// Reader / Writer
// ---------------------------------------------------------------------------

/// Sequential reader over a payload slice. Every read is bounds-checked;
/// running past the end is `UnexpectedEof`, never a panic.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(ProtocolError::UnexpectedEof)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, ProtocolError> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn bool(&mut self) -> Result<bool, ProtocolError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ProtocolError::InvalidValue {
                field: "bool",
                value: u32::from(other),
            }),
        }
    }

    fn string(&mut self) -> Result<String, ProtocolError> {
        let len = usize::from(self.u16()?);
        let bytes = self.bytes(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    fn point(&mut self) -> Result<Point, ProtocolError> {
        Ok(Point::new(self.i32()?, self.i32()?))
    }

    /// Consumes the reader; errors if any bytes were left unread.
    fn finish(self) -> Result<(), ProtocolError> {
        let rest = self.buf.len() - self.pos;
        if rest == 0 {
            Ok(())
        } else {
            Err(ProtocolError::TrailingBytes(rest))
        }
    }
}

/// Append-only writer building an encoded payload.
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_tag(tag: u8) -> Self {
        Self { buf: vec![tag] }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    /// Writes a u16 length prefix and the UTF-8 bytes. All strings on the
    /// wire are truncated far below `u16::MAX` before they get here.
    fn string(&mut self, s: &str) {
        debug_assert!(s.len() <= usize::from(u16::MAX));
        self.u16(s.len() as u16);
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn point(&mut self, p: Point) {
        self.i32(p.x);
        self.i32(p.y);
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Message encode / decode
// ---------------------------------------------------------------------------

impl Message {
    /// The wire tag for this message type.
    pub fn tag(&self) -> u8 {
        match self {
            Message::Login { .. } => tag::LOGIN,
            Message::Request { .. } => tag::REQUEST,
            Message::Lobby { .. } => tag::LOBBY,
            Message::Init { .. } => tag::INIT,
            Message::CreateRoom { .. } => tag::CREATE_ROOM,
            Message::JoinRoom { .. } => tag::JOIN_ROOM,
            Message::PlayerJoin { .. } => tag::PLAYER_JOIN,
            Message::PlayerLeave { .. } => tag::PLAYER_LEAVE,
            Message::PlayerState { .. } => tag::PLAYER_STATE,
            Message::Block { .. } => tag::BLOCK,
            Message::Chat { .. } => tag::CHAT,
            Message::PlayerSmiley { .. } => tag::PLAYER_SMILEY,
            Message::PlayerMode { .. } => tag::PLAYER_MODE,
        }
    }

    /// Encodes this message to its wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_tag(self.tag());
        match self {
            Message::Login { username, color } => {
                w.string(username);
                w.u32(*color);
            }
            Message::Request { kind } => {
                w.u8(kind.to_wire());
            }
            Message::Lobby {
                server_name,
                description,
                intro,
                online,
                rooms,
            } => {
                w.string(server_name);
                w.string(description);
                w.string(intro);
                w.u32(*online);
                debug_assert!(rooms.len() <= usize::from(u16::MAX));
                w.u16(rooms.len() as u16);
                for room in rooms {
                    w.u32(room.id.0);
                    w.string(&room.name);
                    w.string(&room.description);
                    w.u8(room.players);
                    w.u8(room.rating);
                }
            }
            Message::Init {
                width,
                height,
                blocks,
            } => {
                debug_assert_eq!(
                    blocks.len(),
                    usize::from(*width) * usize::from(*height) * Layer::COUNT
                );
                w.u16(*width);
                w.u16(*height);
                w.buf.extend_from_slice(blocks);
            }
            Message::CreateRoom { name, description } => {
                w.string(name);
                w.string(description);
            }
            Message::JoinRoom { room } => {
                w.u32(room.0);
            }
            Message::PlayerJoin {
                username,
                id,
                is_self,
                tint,
            } => {
                w.string(username);
                w.u8(id.0);
                w.bool(*is_self);
                w.u32(*tint);
            }
            Message::PlayerLeave { id } => {
                w.u8(id.0);
            }
            Message::PlayerState {
                id,
                position,
                velocity,
                movement,
                jumping,
            } => {
                w.u8(id.0);
                w.point(*position);
                w.point(*velocity);
                w.point(*movement);
                w.bool(*jumping);
            }
            Message::Block { x, y, layer, block } => {
                w.u16(*x);
                w.u16(*y);
                w.u8(layer.to_wire());
                w.u8(*block);
            }
            Message::Chat { id, text } => {
                w.u8(id.0);
                w.string(text);
            }
            Message::PlayerSmiley { id, smiley } => {
                w.u8(id.0);
                w.u8(smiley.0);
            }
            Message::PlayerMode { id, mode } => {
                w.u8(id.0);
                w.u8(mode.to_wire());
            }
        }
        w.finish()
    }

    /// Decodes one message from its wire bytes.
    ///
    /// Rejects unknown tags, truncated or oversized payloads, and invalid
    /// enumeration values; never panics on attacker-controlled input.
    pub fn decode(data: &[u8]) -> Result<Message, ProtocolError> {
        let mut r = Reader::new(data);
        let tag = r.u8()?;
        let msg = match tag {
            tag::LOGIN => Message::Login {
                username: r.string()?,
                color: r.u32()?,
            },
            tag::REQUEST => {
                let raw = r.u8()?;
                let kind = RequestKind::from_wire(raw).ok_or(
                    ProtocolError::InvalidValue {
                        field: "request kind",
                        value: u32::from(raw),
                    },
                )?;
                Message::Request { kind }
            }
            tag::LOBBY => {
                let server_name = r.string()?;
                let description = r.string()?;
                let intro = r.string()?;
                let online = r.u32()?;
                let count = r.u16()?;
                let mut rooms = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    rooms.push(RoomSummary {
                        id: RoomId(r.u32()?),
                        name: r.string()?,
                        description: r.string()?,
                        players: r.u8()?,
                        rating: r.u8()?,
                    });
                }
                Message::Lobby {
                    server_name,
                    description,
                    intro,
                    online,
                    rooms,
                }
            }
            tag::INIT => {
                let width = r.u16()?;
                let height = r.u16()?;
                let len =
                    usize::from(width) * usize::from(height) * Layer::COUNT;
                let blocks = r.bytes(len)?.to_vec();
                Message::Init {
                    width,
                    height,
                    blocks,
                }
            }
            tag::CREATE_ROOM => Message::CreateRoom {
                name: r.string()?,
                description: r.string()?,
            },
            tag::JOIN_ROOM => Message::JoinRoom {
                room: RoomId(r.u32()?),
            },
            tag::PLAYER_JOIN => Message::PlayerJoin {
                username: r.string()?,
                id: PlayerId(r.u8()?),
                is_self: r.bool()?,
                tint: r.u32()?,
            },
            tag::PLAYER_LEAVE => Message::PlayerLeave {
                id: PlayerId(r.u8()?),
            },
            tag::PLAYER_STATE => Message::PlayerState {
                id: PlayerId(r.u8()?),
                position: r.point()?,
                velocity: r.point()?,
                movement: r.point()?,
                jumping: r.bool()?,
            },
            tag::BLOCK => {
                let x = r.u16()?;
                let y = r.u16()?;
                let raw = r.u8()?;
                let layer = Layer::from_wire(raw).ok_or(
                    ProtocolError::InvalidValue {
                        field: "layer",
                        value: u32::from(raw),
                    },
                )?;
                Message::Block {
                    x,
                    y,
                    layer,
                    block: r.u8()?,
                }
            }
            tag::CHAT => Message::Chat {
                id: PlayerId(r.u8()?),
                text: r.string()?,
            },
            tag::PLAYER_SMILEY => Message::PlayerSmiley {
                id: PlayerId(r.u8()?),
                smiley: Smiley(r.u8()?),
            },
            tag::PLAYER_MODE => {
                let id = PlayerId(r.u8()?);
                let raw = r.u8()?;
                let mode = PlayerMode::from_wire(raw).ok_or(
                    ProtocolError::InvalidValue {
                        field: "player mode",
                        value: u32::from(raw),
                    },
                )?;
                Message::PlayerMode { id, mode }
            }
            other => return Err(ProtocolError::UnknownTag(other)),
        };
        r.finish()?;
        Ok(msg)
    }
}

// =========================================================================
// Tests
// =========================================================================
