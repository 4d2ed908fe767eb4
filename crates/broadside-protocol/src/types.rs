//! Identity and payload types shared by inbound and outbound messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, client-defined board layout.
///
/// The relay never looks inside a board; it stores and forwards it.
pub type Board = serde_json::Value;

/// Identifier of a game session.
///
/// Also used verbatim as the name of the session's multicast room and as
/// the prefix of per-session event names (`<id>:boards`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&GameId::from("ab12cd34")).unwrap();
        assert_eq!(json, "\"ab12cd34\"");
    }

    #[test]
    fn test_game_id_display_is_raw() {
        assert_eq!(GameId::from("zz99zz99").to_string(), "zz99zz99");
    }
}
