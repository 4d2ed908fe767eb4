//! `BroadsideServer` builder and server loop.
//!
//! This is the entry point for running a Broadside relay. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use broadside_protocol::{Codec, JsonCodec};
use broadside_session::{SessionConfig, SessionManager};
use broadside_transport::{
    Handshake, Transport, WebSocketConfig, WebSocketTransport,
};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{BroadsideError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// One lock guards the whole session manager (store and room hub
/// together). Handlers hold it for a single operation and never across an
/// `.await`, so every operation runs to completion before the next starts.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) manager: Mutex<SessionManager>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Broadside server.
///
/// # Example
///
/// ```rust,ignore
/// use broadside::prelude::*;
///
/// let server = BroadsideServer::builder()
///     .bind("0.0.0.0:5050")
///     .allowed_origins(["http://localhost:3000"])
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct BroadsideServerBuilder {
    bind_addr: String,
    ws_config: WebSocketConfig,
    session_config: SessionConfig,
}

impl BroadsideServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(&ServerConfig::default())
    }

    /// Creates a builder preloaded from a [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_address.clone(),
            ws_config: config.websocket_config(),
            session_config: config.session_config(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the request path WebSocket upgrades must use.
    pub fn path(mut self, path: &str) -> Self {
        self.ws_config.path = path.to_string();
        self
    }

    /// Replaces the origin allow-list. Include `"*"` to admit any origin.
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ws_config.allowed_origins =
            origins.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listener and returns a server ready to [`run`].
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// [`run`]: BroadsideServer::run
    pub async fn build(self) -> Result<BroadsideServer, BroadsideError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr, self.ws_config).await?;

        let state = Arc::new(ServerState {
            manager: Mutex::new(SessionManager::new(self.session_config)),
            codec: JsonCodec,
        });

        Ok(BroadsideServer { transport, state })
    }
}

impl Default for BroadsideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Broadside server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BroadsideServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl BroadsideServer {
    /// Creates a new builder.
    pub fn builder() -> BroadsideServerBuilder {
        BroadsideServerBuilder::new()
    }
}

impl<C> BroadsideServer<C>
where
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a task for each that runs
    /// the WebSocket upgrade and then the connection handler, so a peer
    /// that stalls mid-upgrade holds up nobody else. A failed upgrade or a
    /// failing connection is logged and never stops the loop. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), BroadsideError> {
        tracing::info!("Broadside server running");

        loop {
            match self.transport.accept().await {
                Ok(handshake) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let addr = handshake.peer_addr();
                        let conn = match handshake.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(
                                    %addr,
                                    error = %e,
                                    "upgrade failed"
                                );
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
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
