//! `QuizClashServer` builder and accept loop.
//!
//! Ties the layers together: WebSocket transport → protocol → registry →
//! room actors.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use quizclash_game::GameConfig;
use quizclash_protocol::JsonCodec;
use quizclash_room::SessionRegistry;

use crate::handler::handle_connection;
use crate::QuizClashError;

/// Shared server state handed to each connection task. Wrapped in `Arc`
/// so it is cheap to clone across tasks; the registry sits behind a
/// `Mutex` and is locked only for code resolution, never across game
/// operations.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<SessionRegistry>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a server.
///
/// ```rust,ignore
/// let server = QuizClashServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct QuizClashServerBuilder {
    bind_addr: String,
    config: GameConfig,
}

impl QuizClashServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            config: GameConfig::default(),
        }
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the game rules every new room is created with.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<QuizClashServer, QuizClashError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            registry: Mutex::new(SessionRegistry::new(self.config)),
            codec: JsonCodec,
        });
        Ok(QuizClashServer { listener, state })
    }
}

impl Default for QuizClashServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running quiz battle server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct QuizClashServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl QuizClashServer {
    pub fn builder() -> QuizClashServerBuilder {
        QuizClashServerBuilder::new()
    }

    /// The local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), QuizClashError> {
        info!(addr = %self.listener.local_addr()?, "quizclash server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }
}
