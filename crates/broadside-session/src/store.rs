//! The session store: every known game, keyed by id.

use std::collections::HashMap;

use broadside_protocol::GameId;
use rand::Rng;

use crate::Session;

/// Length of a generated game id.
pub const GAME_ID_LEN: usize = 8;

/// Characters a game id is drawn from (base 36, lowercase).
const GAME_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Owns all sessions. Plain `HashMap`: the server serializes access.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<GameId, Session>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh, empty session under a newly generated id.
    ///
    /// Ids are random; on the rare collision with a known id a new one is
    /// drawn.
    pub fn create(&mut self) -> GameId {
        let id = loop {
            let candidate = generate_game_id();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        self.sessions.insert(id.clone(), Session::new(id.clone()));
        id
    }

    /// Looks up a session.
    pub fn get(&self, id: &GameId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Looks up a session for mutation.
    pub fn get_mut(&mut self, id: &GameId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Removes a session, returning it if it existed.
    pub fn remove(&mut self, id: &GameId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Returns `true` if a session with this id exists.
    pub fn contains(&self, id: &GameId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Returns the number of stored sessions (empty ones included).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Draws a random lowercase alphanumeric id of [`GAME_ID_LEN`] characters.
fn generate_game_id() -> GameId {
    let mut rng = rand::rng();
    let id: String = (0..GAME_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..GAME_ID_ALPHABET.len());
            char::from(GAME_ID_ALPHABET[idx])
        })
        .collect();
    GameId::from(id)
}
