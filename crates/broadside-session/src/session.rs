//! Session types: a game's shared state and a connection's binding to it.

use broadside_protocol::{Board, GameId};
use broadside_transport::ConnectionId;

/// Number of players a game admits.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Remove a game from the store once its last player leaves.
    ///
    /// Default `false`: empty games stay in the store for the life of the
    /// process, and a late joiner can still enter them.
    pub evict_empty_sessions: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single two-player game.
///
/// Created by one connection's `createGame`; mutated by joins, leaves,
/// board submissions and attacks from its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The game's id, also its room name.
    pub id: GameId,

    /// Players currently joined, `0..=MAX_PLAYERS`.
    pub player_count: usize,

    /// Reserved board history. Echoed in `subscription_succeeded`.
    pub boards: Vec<Board>,

    /// First board, once submitted.
    pub board1: Option<Board>,

    /// Second board, once submitted.
    pub board2: Option<Board>,
}

impl Session {
    /// Creates an empty game with no players and no boards.
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            player_count: 0,
            boards: Vec::new(),
            board1: None,
            board2: None,
        }
    }

    /// Returns `true` if no further player may join.
    pub fn is_full(&self) -> bool {
        self.player_count >= MAX_PLAYERS
    }
}

// ---------------------------------------------------------------------------
// Peer
// ---------------------------------------------------------------------------

/// A connection's view of the session layer: who it is and which game it
/// is bound to.
///
/// ```text
///   Unbound ──(create / join ok)──→ Bound(id) ──(disconnect)──→ gone
/// ```
///
/// Owned by the connection handler and passed to every manager call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    conn: ConnectionId,
    game: Option<GameId>,
}

impl Peer {
    /// Creates an unbound peer for a fresh connection.
    pub fn new(conn: ConnectionId) -> Self {
        Self { conn, game: None }
    }

    /// The connection this peer belongs to.
    pub fn conn(&self) -> ConnectionId {
        self.conn
    }

    /// The game this connection is bound to, if any.
    pub fn game(&self) -> Option<&GameId> {
        self.game.as_ref()
    }

    /// Returns `true` if the connection is bound to `id`.
    pub fn is_bound_to(&self, id: &GameId) -> bool {
        self.game.as_ref() == Some(id)
    }

    pub(crate) fn bind(&mut self, id: GameId) {
        self.game = Some(id);
    }

    pub(crate) fn unbind(&mut self) -> Option<GameId> {
        self.game.take()
    }
}
