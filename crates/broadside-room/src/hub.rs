//! The room hub: connection registry plus room membership.

use std::collections::{BTreeSet, HashMap};

use broadside_protocol::{GameId, ServerEvent};
use broadside_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering events to one connection's handler.
///
/// Unbounded so that session operations never wait on a slow socket.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// The receiving half, drained by the connection handler.
pub type OutboundReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Creates the outbound channel for a new connection.
pub fn outbound_channel() -> (OutboundSender, OutboundReceiver) {
    mpsc::unbounded_channel()
}

/// Tracks live connections and the rooms they belong to.
///
/// Not thread-safe by itself; the server keeps it behind the same lock as
/// the session store so membership and session state change together.
#[derive(Debug, Default)]
pub struct RoomHub {
    /// Outbound channel per registered connection.
    connections: HashMap<ConnectionId, OutboundSender>,

    /// Members of each room. Ordered so fan-out is deterministic.
    rooms: HashMap<GameId, BTreeSet<ConnectionId>>,
}

impl RoomHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound channel.
    pub fn register(&mut self, conn: ConnectionId, sender: OutboundSender) {
        self.connections.insert(conn, sender);
        tracing::debug!(%conn, "connection registered");
    }

    /// Forgets a connection and removes it from every room it joined.
    pub fn unregister(&mut self, conn: ConnectionId) {
        self.connections.remove(&conn);
        self.rooms.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
        tracing::debug!(%conn, "connection unregistered");
    }

    /// Subscribes a connection to a room. Joining twice is a no-op.
    pub fn join(&mut self, conn: ConnectionId, room: &GameId) {
        let inserted = self.rooms.entry(room.clone()).or_default().insert(conn);
        if inserted {
            tracing::debug!(%conn, %room, "joined room");
        }
    }

    /// Unsubscribes a connection from a room. Empty rooms are dropped.
    pub fn leave(&mut self, conn: ConnectionId, room: &GameId) {
        if let Some(members) = self.rooms.get_mut(room) {
            if members.remove(&conn) {
                tracing::debug!(%conn, %room, "left room");
            }
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Sends an event to a single connection. Silently drops it if the
    /// connection is unknown or its handler has gone away.
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&conn) {
            let _ = sender.send(event);
        }
    }

    /// Sends an event to every member of a room, including the member
    /// whose request caused it.
    pub fn broadcast(&self, room: &GameId, event: ServerEvent) {
        let Some(members) = self.rooms.get(room) else {
            return;
        };
        for conn in members {
            self.send_to(*conn, event.clone());
        }
    }

    /// Returns `true` if `conn` is subscribed to `room`.
    pub fn is_member(&self, conn: ConnectionId, room: &GameId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(&conn))
    }

    /// Lists the members of a room, in connection-id order.
    pub fn members(&self, room: &GameId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
