//! Client → server messages.
//!
//! Every inbound frame is `{ "type": <name>, ...fields }`. Decoding into
//! [`ClientMessage`] is the validation boundary: a frame that names a known
//! type but is missing a field, or carries a field of the wrong type, fails
//! to decode and never reaches the session layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Board, GameId};

/// A request from a connected client, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Reserved for player naming. Accepted and ignored.
    #[serde(rename = "saveName")]
    SaveName {
        #[serde(default)]
        name: Option<String>,
    },

    /// Create a new game and join it as its first player.
    #[serde(rename = "createGame")]
    CreateGame {},

    /// Join an existing game by id.
    #[serde(rename = "joinGame")]
    JoinGame {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    /// A shot at the opponent's board, relayed to the whole game.
    #[serde(rename = "client-fire")]
    ClientFire(Attack),

    /// Both boards for a game, stored for the `<id>:boards` broadcast.
    #[serde(rename = "created-board")]
    CreatedBoard(BoardSubmission),

    /// Any `type` this server does not know. Ignored.
    #[serde(other)]
    Unknown,
}

/// A `client-fire` payload.
///
/// `player` identifies the attacker, `score` is the opponent's running
/// score, `board_id` names the board being updated and `board` is its new
/// state. Only `game_id` is interpreted; the rest must be present but may
/// hold any JSON value, and the relay forwards them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub game_id: GameId,
    pub player: Value,
    pub score: Value,
    pub board_id: Value,
    pub board: Board,
}

/// A `created-board` payload.
///
/// `game_id` is optional on the wire for older clients that only ever sit
/// in one game; the handler falls back to the connection's bound game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSubmission {
    #[serde(default)]
    pub game_id: Option<GameId>,
    pub board1: Board,
    pub board2: Board,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: serde_json::Value) -> Result<ClientMessage, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_create_game_decodes_with_extra_fields() {
        let msg = decode(json!({ "type": "createGame", "extra": 1 })).unwrap();
        assert_eq!(msg, ClientMessage::CreateGame {});
    }

    #[test]
    fn test_join_game_reads_camel_case_game_id() {
        let msg = decode(json!({ "type": "joinGame", "gameId": "ab12cd34" })).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinGame { game_id: GameId::from("ab12cd34") }
        );
    }

    #[test]
    fn test_join_game_without_game_id_is_rejected() {
        assert!(decode(json!({ "type": "joinGame" })).is_err());
    }

    #[test]
    fn test_save_name_name_is_optional() {
        let msg = decode(json!({ "type": "saveName" })).unwrap();
        assert_eq!(msg, ClientMessage::SaveName { name: None });

        let msg = decode(json!({ "type": "saveName", "name": "ada" })).unwrap();
        assert_eq!(msg, ClientMessage::SaveName { name: Some("ada".into()) });
    }

    #[test]
    fn test_client_fire_decodes_all_fields() {
        let msg = decode(json!({
            "type": "client-fire",
            "gameId": "ab12cd34",
            "player": 1,
            "score": 3,
            "boardId": 0,
            "board": [[0, 1], [2, 0]],
        }))
        .unwrap();

        let ClientMessage::ClientFire(attack) = msg else {
            panic!("expected ClientFire, got {msg:?}");
        };
        assert_eq!(attack.game_id, GameId::from("ab12cd34"));
        assert_eq!(attack.player, json!(1));
        assert_eq!(attack.score, json!(3));
        assert_eq!(attack.board_id, json!(0));
        assert_eq!(attack.board, json!([[0, 1], [2, 0]]));
    }

    #[test]
    fn test_client_fire_missing_board_is_rejected() {
        let result = decode(json!({
            "type": "client-fire",
            "gameId": "ab12cd34",
            "player": 1,
            "score": 3,
            "boardId": 0,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_fire_keeps_non_numeric_fields_verbatim() {
        let msg = decode(json!({
            "type": "client-fire",
            "gameId": "ab12cd34",
            "player": "alice",
            "score": -1.5,
            "boardId": "left",
            "board": [],
        }))
        .unwrap();

        let ClientMessage::ClientFire(attack) = msg else {
            panic!("expected ClientFire, got {msg:?}");
        };
        assert_eq!(attack.player, json!("alice"));
        assert_eq!(attack.score, json!(-1.5));
        assert_eq!(attack.board_id, json!("left"));
    }

    #[test]
    fn test_client_fire_missing_player_is_rejected() {
        let result = decode(json!({
            "type": "client-fire",
            "gameId": "ab12cd34",
            "score": 3,
            "boardId": 0,
            "board": [],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_fire_non_string_game_id_is_rejected() {
        let result = decode(json!({
            "type": "client-fire",
            "gameId": 7,
            "player": 1,
            "score": 3,
            "boardId": 0,
            "board": [],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_created_board_game_id_is_optional() {
        let msg = decode(json!({
            "type": "created-board",
            "board1": { "ships": [1] },
            "board2": { "ships": [2] },
        }))
        .unwrap();

        let ClientMessage::CreatedBoard(submission) = msg else {
            panic!("expected CreatedBoard, got {msg:?}");
        };
        assert!(submission.game_id.is_none());
        assert_eq!(submission.board1, json!({ "ships": [1] }));
    }

    #[test]
    fn test_unknown_type_decodes_to_unknown() {
        let msg = decode(json!({ "type": "flyToMoon", "speed": 9000 })).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        assert!(decode(json!({ "gameId": "ab12cd34" })).is_err());
    }
}
