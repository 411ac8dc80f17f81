//! `SkycardsServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → room.

use std::sync::Arc;

use skycards_protocol::{Codec, JsonCodec};
use skycards_room::{Matchmaker, RoomConfig};
use skycards_session::{AccountBook, Authenticator, SessionManager};
use skycards_transport::{DEFAULT_MAX_LINE_LEN, LineTransport, Transport};
use tokio::sync::Mutex;

use crate::SkycardsError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<A: Authenticator, C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) matchmaker: Matchmaker,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

/// Everything a server needs before it binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Longest inbound line, in bytes. A longer line ends the connection.
    pub max_line_len: usize,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            room: RoomConfig::default(),
        }
    }
}

/// Builder for configuring and starting a Skycards server.
///
/// # Example
///
/// ```rust,no_run
/// use skycards::prelude::*;
///
/// # async fn start() -> Result<(), SkycardsError> {
/// let server = SkycardsServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(AccountBook::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SkycardsServerBuilder {
    config: ServerConfig,
}

impl SkycardsServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the inbound line limit.
    pub fn max_line_len(mut self, max_line_len: usize) -> Self {
        self.config.max_line_len = max_line_len;
        self
    }

    /// Sets pauses, move timeout, and code length for every room.
    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and returns a server ready to [`run`].
    ///
    /// [`run`]: SkycardsServer::run
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<SkycardsServer<A, JsonCodec>, SkycardsError> {
        let transport =
            LineTransport::bind(&self.config.bind_addr, self.config.max_line_len)
                .await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            matchmaker: Matchmaker::new(self.config.room),
            auth,
            codec: JsonCodec,
        });

        Ok(SkycardsServer { transport, state })
    }
}

impl Default for SkycardsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Skycards server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SkycardsServer<A: Authenticator, C: Codec> {
    transport: LineTransport,
    state: Arc<ServerState<A, C>>,
}

impl SkycardsServer<AccountBook, JsonCodec> {
    /// Starts a builder. The authenticator is chosen at
    /// [`build`](SkycardsServerBuilder::build).
    pub fn builder() -> SkycardsServerBuilder {
        SkycardsServerBuilder::new()
    }
}

impl<A, C> SkycardsServer<A, C>
where
    A: Authenticator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The server's matchmaker, for inspecting rooms from outside.
    pub fn matchmaker(&self) -> &Matchmaker {
        &self.state.matchmaker
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), SkycardsError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Skycards server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
