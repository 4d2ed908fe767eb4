//! Server → client event frames.
//!
//! Every outbound frame is `{ "event": <name>, "message": <body> }`.
//! Per-game events carry the game id as a prefix of the event name
//! (`ab12cd34:member_added`) so a client sitting on one socket can route
//! them without inspecting the body.

use serde::Serialize;
use serde_json::Value;

use crate::{Attack, Board, GameId};

/// One event frame, ready to encode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerEvent {
    /// Event name, possibly prefixed with `<gameId>:`.
    pub event: String,
    /// Event body. Shape depends on the event.
    pub message: EventBody,
}

/// The `message` half of a [`ServerEvent`].
///
/// Untagged: each variant serializes as its bare fields, which is what the
/// browser client expects. `Count` serializes as a plain integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum EventBody {
    Game {
        game_id: GameId,
    },
    JoinFailed {
        message: String,
        game_id: GameId,
    },
    Members {
        count: usize,
        game_id: GameId,
    },
    Subscription {
        count: usize,
        game_id: GameId,
        boards: Vec<Board>,
    },
    Boards {
        game_id: GameId,
        board1: Option<Board>,
        board2: Option<Board>,
    },
    Fire {
        board_id: Value,
        board: Board,
        player: Value,
        score: Value,
        can_play: bool,
    },
    Count(usize),
}

impl ServerEvent {
    fn new(event: impl Into<String>, message: EventBody) -> Self {
        Self {
            event: event.into(),
            message,
        }
    }

    /// `game_created {gameId}` — unicast to the creator.
    pub fn game_created(game_id: &GameId) -> Self {
        Self::new("game_created", EventBody::Game { game_id: game_id.clone() })
    }

    /// `join_failed {message, gameId}` — unicast to the requester.
    pub fn join_failed(reason: impl Into<String>, game_id: &GameId) -> Self {
        Self::new(
            "join_failed",
            EventBody::JoinFailed {
                message: reason.into(),
                game_id: game_id.clone(),
            },
        )
    }

    /// `join_successful {gameId}` — unicast to the joiner.
    pub fn join_successful(game_id: &GameId) -> Self {
        Self::new(
            "join_successful",
            EventBody::Game { game_id: game_id.clone() },
        )
    }

    /// `<gameId>:member_added {count, gameId}` — multicast.
    pub fn member_added(game_id: &GameId, count: usize) -> Self {
        Self::new(
            format!("{game_id}:member_added"),
            EventBody::Members {
                count,
                game_id: game_id.clone(),
            },
        )
    }

    /// `<gameId>:subscription_succeeded {count, gameId, boards}` — multicast.
    pub fn subscription_succeeded(
        game_id: &GameId,
        count: usize,
        boards: &[Board],
    ) -> Self {
        Self::new(
            format!("{game_id}:subscription_succeeded"),
            EventBody::Subscription {
                count,
                game_id: game_id.clone(),
                boards: boards.to_vec(),
            },
        )
    }

    /// `<gameId>:boards {gameId, board1, board2}` — multicast. Boards not
    /// yet submitted encode as `null`.
    pub fn boards(
        game_id: &GameId,
        board1: Option<&Board>,
        board2: Option<&Board>,
    ) -> Self {
        Self::new(
            format!("{game_id}:boards"),
            EventBody::Boards {
                game_id: game_id.clone(),
                board1: board1.cloned(),
                board2: board2.cloned(),
            },
        )
    }

    /// `client-fire {boardId, board, player, score, canPlay: true}` —
    /// multicast. The attack's fields pass through unchanged.
    pub fn client_fire(attack: &Attack) -> Self {
        Self::new(
            "client-fire",
            EventBody::Fire {
                board_id: attack.board_id.clone(),
                board: attack.board.clone(),
                player: attack.player.clone(),
                score: attack.score.clone(),
                can_play: true,
            },
        )
    }

    /// `member_removed` with a bare integer count — multicast.
    pub fn member_removed(count: usize) -> Self {
        Self::new("member_removed", EventBody::Count(count))
    }
}
