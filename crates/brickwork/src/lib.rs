//! # Brickwork
//!
//! The authoritative server core of a real-time multiplayer 2D
//! world-editing game. Clients connect over WebSocket, log in, and enter
//! rooms where block edits, movement, chat, and appearance changes are
//! validated and fanned out to the other occupants.
//!
//! The design has one load-bearing rule: a single dispatch task consumes
//! every transport event in arrival order and is the only mutator of
//! server state. Rooms, rosters, and pending logins are plain data owned
//! by the [`Dispatcher`]; no locks, no partial updates visible anywhere.
//!
//! ```rust,no_run
//! use brickwork::{Server, ServerConfig};
//!
//! # async fn run() -> Result<(), brickwork::BrickworkError> {
//! let server = Server::builder()
//!     .config(ServerConfig::default())
//!     .build()
//!     .await?;
//! server.run().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod error;
mod relay;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::BrickworkError;
pub use relay::Relay;
pub use server::{Server, ServerBuilder};
