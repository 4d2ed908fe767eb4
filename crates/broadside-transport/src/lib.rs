//! Transport abstraction layer for Broadside.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the server
//! accept loop and connection handlers are written against, plus the
//! WebSocket implementation clients actually talk to.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    WebSocketConfig, WebSocketConnection, WebSocketHandshake, WebSocketTransport,
};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Accepting is split in two so one slow peer cannot stall the others:
/// `accept` only takes the next peer off the listener, and the returned
/// [`Handshake`] finishes protocol negotiation, typically on the peer's
/// own task.
pub trait Transport: Send + Sync + 'static {
    /// A peer that has been accepted but not yet negotiated.
    type Handshake: Handshake<Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next incoming peer.
    async fn accept(&mut self) -> Result<Self::Handshake, Self::Error>;
}

/// The second half of accepting a connection.
pub trait Handshake: Send + 'static {
    /// The connection type produced once negotiation succeeds.
    type Connection: Connection;
    /// The error type for a failed negotiation.
    type Error: std::error::Error + Send + Sync;

    /// Negotiates with the peer and yields the ready connection.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single full-duplex connection carrying whole messages.
///
/// `send` and `recv` may be awaited concurrently from the same task
/// (e.g. in a `tokio::select!`); implementations must not hold a shared
/// lock across both directions.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_orders_by_value() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1)];
        ids.sort();
        assert_eq!(ids, vec![ConnectionId::new(1), ConnectionId::new(3)]);
    }
}
