//! The session manager: every game operation the relay performs.
//!
//! Each method runs to completion synchronously. Events are pushed onto
//! per-connection channels through the [`RoomHub`] and written to sockets
//! later by the connection handlers, so no method ever waits on I/O.
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself. The server keeps exactly
//! one behind a mutex; holding the lock for a whole operation is what
//! guarantees no two operations touch a game at the same time.

use broadside_protocol::{Attack, Board, GameId, ServerEvent};
use broadside_room::{OutboundSender, RoomHub};
use broadside_transport::ConnectionId;

use crate::{Peer, Session, SessionConfig, SessionError, SessionStore};

/// Owns the session store and the room hub and applies game operations.
///
/// ## Lifecycle of one game
///
/// ```text
/// create_session ──→ join_session ──→ join_session ──→ [2 players]
///                                                          │
///        submit_boards / relay_attack / broadcast_boards ◀─┘
///                                                          │
///                                  disconnect ──→ leave_session
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    store: SessionStore,
    rooms: RoomHub,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a manager with an empty store.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            store: SessionStore::new(),
            rooms: RoomHub::new(),
            config,
        }
    }

    /// Registers a new connection's outbound channel.
    pub fn connect(&mut self, conn: ConnectionId, sender: OutboundSender) {
        self.rooms.register(conn, sender);
    }

    /// Creates a new, empty game, subscribes the caller to its room and
    /// binds the caller to it. Replies `game_created` to the caller.
    ///
    /// The caller is NOT counted as a player until it joins.
    pub fn create_session(&mut self, peer: &mut Peer) -> GameId {
        let game_id = self.store.create();
        self.bind(peer, &game_id);

        tracing::info!(%game_id, conn = %peer.conn(), "game created");
        self.rooms
            .send_to(peer.conn(), ServerEvent::game_created(&game_id));
        game_id
    }

    /// Admits the caller into a game as a player.
    ///
    /// On success the caller gets `join_successful`, then the whole room
    /// (caller included) gets `<id>:member_added` and
    /// `<id>:subscription_succeeded`, in that order. Returns the new
    /// player count.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such game
    /// - [`SessionError::Full`] — the game already has two players
    ///
    /// Either way the caller is sent `join_failed` and nothing changes.
    pub fn join_session(
        &mut self,
        peer: &mut Peer,
        game_id: &GameId,
    ) -> Result<usize, SessionError> {
        let admission = match self.store.get(game_id) {
            None => Err(SessionError::NotFound(game_id.clone())),
            Some(session) if session.is_full() => {
                Err(SessionError::Full(game_id.clone()))
            }
            Some(_) => Ok(()),
        };
        if let Err(err) = admission {
            tracing::debug!(%game_id, conn = %peer.conn(), reason = %err, "join rejected");
            self.rooms.send_to(
                peer.conn(),
                ServerEvent::join_failed(err.to_string(), game_id),
            );
            return Err(err);
        }

        self.bind(peer, game_id);

        let Some(session) = self.store.get_mut(game_id) else {
            return Err(SessionError::NotFound(game_id.clone()));
        };
        session.player_count += 1;
        let count = session.player_count;
        let boards = session.boards.clone();

        tracing::info!(%game_id, conn = %peer.conn(), count, "player joined");

        self.rooms
            .send_to(peer.conn(), ServerEvent::join_successful(game_id));
        self.rooms
            .broadcast(game_id, ServerEvent::member_added(game_id, count));
        self.rooms.broadcast(
            game_id,
            ServerEvent::subscription_succeeded(game_id, count, &boards),
        );
        Ok(count)
    }

    /// Stores both boards on a game the caller is bound to. No event is
    /// emitted; the boards go out with the next [`broadcast_boards`].
    ///
    /// # Errors
    /// - [`SessionError::NotMember`] — the caller is not bound to `game_id`
    /// - [`SessionError::NotFound`] — the game no longer exists
    ///
    /// [`broadcast_boards`]: Self::broadcast_boards
    pub fn submit_boards(
        &mut self,
        peer: &Peer,
        game_id: &GameId,
        board1: Board,
        board2: Board,
    ) -> Result<(), SessionError> {
        if !peer.is_bound_to(game_id) {
            return Err(SessionError::NotMember {
                conn: peer.conn(),
                game_id: game_id.clone(),
            });
        }
        let session = self
            .store
            .get_mut(game_id)
            .ok_or_else(|| SessionError::NotFound(game_id.clone()))?;

        session.board1 = Some(board1);
        session.board2 = Some(board2);
        tracing::debug!(%game_id, conn = %peer.conn(), "boards stored");
        Ok(())
    }

    /// Multicasts `<id>:boards` if and only if the game has exactly two
    /// players. Silently does nothing otherwise.
    pub fn broadcast_boards(&self, game_id: &GameId) {
        let Some(session) = self.store.get(game_id) else {
            return;
        };
        if session.player_count != crate::MAX_PLAYERS {
            return;
        }
        self.rooms.broadcast(
            game_id,
            ServerEvent::boards(
                game_id,
                session.board1.as_ref(),
                session.board2.as_ref(),
            ),
        );
    }

    /// Multicasts `client-fire` (with `canPlay: true`) to the attack's
    /// game.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] — no such game
    /// - [`SessionError::NotMember`] — the caller is not bound to it
    pub fn relay_attack(
        &self,
        peer: &Peer,
        attack: &Attack,
    ) -> Result<(), SessionError> {
        let game_id = &attack.game_id;
        if !self.store.contains(game_id) {
            return Err(SessionError::NotFound(game_id.clone()));
        }
        if !peer.is_bound_to(game_id) {
            return Err(SessionError::NotMember {
                conn: peer.conn(),
                game_id: game_id.clone(),
            });
        }

        tracing::debug!(
            %game_id,
            conn = %peer.conn(),
            player = %attack.player,
            board_id = %attack.board_id,
            "relaying attack"
        );
        self.rooms
            .broadcast(game_id, ServerEvent::client_fire(attack));
        Ok(())
    }

    /// Removes one player from a game and multicasts `member_removed` with
    /// the new count to whoever is still in the room.
    ///
    /// The count never drops below zero. When eviction is enabled, a game
    /// whose count reaches zero is removed from the store. Returns the new
    /// count, or `None` if the game does not exist.
    ///
    /// Callers unsubscribe the leaving connection first, so it does not
    /// receive its own `member_removed`.
    pub fn leave_session(&mut self, game_id: &GameId) -> Option<usize> {
        let session = self.store.get_mut(game_id)?;
        session.player_count = session.player_count.saturating_sub(1);
        let count = session.player_count;

        tracing::info!(%game_id, count, "player left");
        self.rooms
            .broadcast(game_id, ServerEvent::member_removed(count));

        if count == 0 && self.config.evict_empty_sessions {
            self.store.remove(game_id);
            tracing::info!(%game_id, "empty game evicted");
        }
        Some(count)
    }

    /// Tears down a connection: leaves its bound game (if any) and drops
    /// its outbound channel.
    pub fn disconnect(&mut self, peer: &mut Peer) {
        self.release(peer);
        self.rooms.unregister(peer.conn());
    }

    /// Looks up a game.
    pub fn get(&self, game_id: &GameId) -> Option<&Session> {
        self.store.get(game_id)
    }

    /// Returns the number of known games.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no games are known.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read access to room membership.
    pub fn rooms(&self) -> &RoomHub {
        &self.rooms
    }

    /// Subscribes `peer` to `game_id` and records the binding. A peer bound
    /// to a different game leaves that one first, so a connection is only
    /// ever counted in one game.
    fn bind(&mut self, peer: &mut Peer, game_id: &GameId) {
        if peer.game().is_some_and(|current| current != game_id) {
            self.release(peer);
        }
        self.rooms.join(peer.conn(), game_id);
        peer.bind(game_id.clone());
    }

    /// Unsubscribes `peer` from its bound game, then leaves it.
    fn release(&mut self, peer: &mut Peer) {
        if let Some(game_id) = peer.unbind() {
            self.rooms.leave(peer.conn(), &game_id);
            self.leave_session(&game_id);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
