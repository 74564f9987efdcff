//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings for a Brickwork server.
///
/// Loadable from a JSON file; missing fields fall back to the defaults, so
/// a config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub address: String,

    /// Server name shown in lobby listings.
    pub name: String,

    /// Server description shown in lobby listings.
    pub description: String,

    /// Intro text shown to clients entering the lobby.
    pub intro: String,

    /// Player cap per room; in-room ids are allocated below this.
    pub max_players: usize,

    /// Width, in tiles, of every created room.
    pub room_width: u16,

    /// Height, in tiles, of every created room.
    pub room_height: u16,

    /// Name of the room created at startup.
    pub default_room_name: String,

    /// Description of the room created at startup.
    pub default_room_description: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:14242".to_string(),
            name: "Brickwork".to_string(),
            description: "A Brickwork server".to_string(),
            intro: "Welcome! Pick a room or create your own.".to_string(),
            max_players: 8,
            room_width: 200,
            room_height: 100,
            default_room_name: "Main World".to_string(),
            default_room_description:
                "A large world for anyone to play and build!".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON or has wrong field types.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
