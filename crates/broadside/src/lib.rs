//! # Broadside
//!
//! Real-time relay server for two-player Battleship.
//!
//! Broadside does not play the game. Browser clients own the rules; the
//! server creates game sessions, admits at most two players into each,
//! stores the boards they submit and relays attacks and membership changes
//! to everyone in the session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn run() -> Result<(), BroadsideError> {
//! let server = BroadsideServer::builder()
//!     .bind("0.0.0.0:5050")
//!     .path("/my-custom-path/")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::BroadsideError;
pub use server::{BroadsideServer, BroadsideServerBuilder};

/// Convenience re-exports for typical use.
pub mod prelude {
    pub use crate::{
        BroadsideError, BroadsideServer, BroadsideServerBuilder, ConfigError,
        ServerConfig,
    };
    pub use broadside_protocol::{
        Attack, Board, BoardSubmission, ClientMessage, Codec, EventBody,
        GameId, JsonCodec, ProtocolError, ServerEvent,
    };
    pub use broadside_session::{
        MAX_PLAYERS, Peer, Session, SessionConfig, SessionError,
        SessionManager,
    };
    pub use broadside_transport::{
        ConnectionId, TransportError, WebSocketConfig,
    };
}
