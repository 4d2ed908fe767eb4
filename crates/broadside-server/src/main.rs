//! Broadside relay server.
//!
//! Listens for WebSocket clients and relays two-player Battleship games
//! between them.
//!
//! # Configuration
//!
//! Read from the environment at startup (see [`ServerConfig`]):
//! - `BROADSIDE_BIND_ADDRESS` (default: 0.0.0.0:5050)
//! - `BROADSIDE_PATH` (default: /my-custom-path/)
//! - `BROADSIDE_ALLOWED_ORIGINS` comma-separated (default: *)
//! - `BROADSIDE_EVICT_EMPTY_SESSIONS` (default: false)
//!
//! Log verbosity follows `RUST_LOG` (default: `broadside=info`).
//!
//! # Client flow
//!
//! ```text
//! A: {"type":"createGame"}              → game_created, join_successful, ...
//! B: {"type":"joinGame","gameId":"…"}   → join_successful, <id>:member_added, ...
//! A: {"type":"client-fire",...}         → client-fire to A and B
//! ```

use broadside::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "broadside=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        bind_address = %config.bind_address,
        path = %config.path,
        allowed_origins = ?config.allowed_origins,
        evict_empty_sessions = config.evict_empty_sessions,
        "Starting Broadside"
    );

    let server = BroadsideServerBuilder::from_config(&config).build().await?;
    info!(addr = %server.local_addr()?, "listening");

    server.run().await?;
    Ok(())
}
