//! `Server` builder and the dispatch loop.

use brickwork_transport::WebSocketListener;
use tokio::sync::mpsc;

use crate::{BrickworkError, Dispatcher, ServerConfig};

/// Builder for configuring and starting a Brickwork server.
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the bind address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.address = addr.to_string();
        self
    }

    /// Binds the listener and constructs the server.
    pub async fn build(self) -> Result<Server, BrickworkError> {
        let listener = WebSocketListener::bind(&self.config.address).await?;
        let dispatcher = Dispatcher::new(self.config);
        Ok(Server {
            listener,
            dispatcher,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run Brickwork server.
pub struct Server {
    listener: WebSocketListener,
    dispatcher: Dispatcher,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server until the process is terminated.
    ///
    /// The accept loop runs in its own task; this task becomes the single
    /// consumer of transport events. Every room, roster, and session
    /// mutation happens here, one event at a time, in arrival order —
    /// that ordering is the server's whole locking story.
    pub async fn run(mut self) {
        tracing::info!(
            name = %self.dispatcher.config().name,
            max_players = self.dispatcher.config().max_players,
            "Brickwork server running"
        );

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        tokio::spawn(self.listener.run(events_tx));

        while let Some(event) = events_rx.recv().await {
            self.dispatcher.handle(event);
        }
    }
}
