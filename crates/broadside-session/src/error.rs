//! Error types for the session layer.

use broadside_protocol::GameId;
use broadside_transport::ConnectionId;

/// Errors that can occur during session operations.
///
/// The `Display` text of `NotFound` and `Full` is sent to clients verbatim
/// as the `message` of a `join_failed` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No game with this id is known.
    #[error("Game not found")]
    NotFound(GameId),

    /// The game already has its two players.
    #[error("Game is full")]
    Full(GameId),

    /// The connection asked to act on a game it is not bound to.
    #[error("{conn} is not a member of game {game_id}")]
    NotMember {
        conn: ConnectionId,
        game_id: GameId,
    },
}
