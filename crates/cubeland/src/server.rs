//! `CubelandServer` builder and accept loop.
//!
//! This is the entry point for running a Cubeland server. It ties the
//! layers together: transport → protocol → world + market.

use std::sync::Arc;

use cubeland_market::MarketLedger;
use cubeland_protocol::{Codec, JsonCodec};
use cubeland_transport::{Transport, WebSocketTransport};
use cubeland_world::{RoomRegistry, WorldConfig};
use tokio::sync::Mutex;

use crate::accounts::AccountSource;
use crate::handler::handle_connection;
use crate::index::ConnectionIndex;
use crate::CubelandError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState<A: AccountSource, C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) market: Mutex<MarketLedger>,
    pub(crate) index: Mutex<ConnectionIndex>,
    pub(crate) accounts: A,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Cubeland server.
///
/// # Example
///
/// ```rust,ignore
/// use cubeland::prelude::*;
///
/// let server = CubelandServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(my_accounts)
///     .await?;
/// server.run().await
/// ```
pub struct CubelandServerBuilder {
    bind_addr: String,
    world_config: WorldConfig,
}

impl CubelandServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            world_config: WorldConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the world configuration (capacity, map bounds, invite TTL).
    pub fn world_config(mut self, config: WorldConfig) -> Self {
        self.world_config = config;
        self
    }

    /// Builds and starts the server with the given account source.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<A: AccountSource>(
        self,
        accounts: A,
    ) -> Result<CubelandServer<A, JsonCodec>, CubelandError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(self.world_config)),
            market: Mutex::new(MarketLedger::new()),
            index: Mutex::new(ConnectionIndex::new()),
            accounts,
            codec: JsonCodec,
        });

        Ok(CubelandServer { transport, state })
    }
}

impl Default for CubelandServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cubeland server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CubelandServer<A: AccountSource, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
}

impl<A, C> CubelandServer<A, C>
where
    A: AccountSource,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> CubelandServerBuilder {
        CubelandServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CubelandError> {
        tracing::info!("Cubeland server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
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
