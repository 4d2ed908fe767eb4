//! Per-connection handler: request decoding, dispatch and event delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the room hub
//!   2. Loop: decode inbound requests and apply them to the session
//!      manager, while draining queued events onto the socket
//!   3. On close or error: leave the bound game, unregister and send a
//!      close frame

use std::sync::Arc;

use broadside_protocol::{ClientMessage, Codec, GameId};
use broadside_room::{OutboundReceiver, outbound_channel};
use broadside_session::Peer;
use broadside_transport::{Connection, WebSocketConnection};

use crate::BroadsideError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), BroadsideError> {
    let conn_id = conn.id();
    tracing::info!(%conn_id, addr = %conn.peer_addr(), "client connected");

    let (tx, mut outbound) = outbound_channel();
    let mut peer = Peer::new(conn_id);
    state.manager.lock().await.connect(conn_id, tx);

    let result = serve(&conn, &state, &mut peer, &mut outbound).await;

    // Cleanup runs whether the loop ended cleanly or not.
    state.manager.lock().await.disconnect(&mut peer);
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close after disconnect failed");
    }
    tracing::info!(%conn_id, "client disconnected");
    result
}

/// The message loop. Returns `Ok` when the client closes the socket.
async fn serve<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    peer: &mut Peer,
    outbound: &mut OutboundReceiver,
) -> Result<(), BroadsideError> {
    loop {
        tokio::select! {
            incoming = conn.recv() => match incoming? {
                Some(data) => handle_frame(state, peer, &data).await,
                None => return Ok(()),
            },
            Some(event) = outbound.recv() => {
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }
        }
    }
}

/// Decodes one inbound frame and applies it. Frames that fail to decode
/// are dropped without a reply.
async fn handle_frame<C: Codec>(
    state: &ServerState<C>,
    peer: &mut Peer,
    data: &[u8],
) {
    let msg: ClientMessage = match state.codec.decode(data) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(
                conn_id = %peer.conn(),
                error = %e,
                "ignoring malformed frame"
            );
            return;
        }
    };

    let mut manager = state.manager.lock().await;
    match msg {
        ClientMessage::SaveName { name } => {
            tracing::debug!(conn_id = %peer.conn(), ?name, "saveName ignored");
        }
        ClientMessage::CreateGame {} => {
            let game_id = manager.create_session(peer);
            // The creator is always admitted into a fresh game.
            if let Err(e) = manager.join_session(peer, &game_id) {
                tracing::debug!(
                    conn_id = %peer.conn(),
                    %game_id,
                    error = %e,
                    "creator could not join"
                );
            }
        }
        ClientMessage::JoinGame { game_id } => {
            // Members of a full game hear `<id>:boards` even when this
            // join is the one refused.
            let _ = manager.join_session(peer, &game_id);
            manager.broadcast_boards(&game_id);
        }
        ClientMessage::ClientFire(attack) => {
            match manager.relay_attack(peer, &attack) {
                Ok(()) => manager.broadcast_boards(&attack.game_id),
                Err(e) => tracing::debug!(
                    conn_id = %peer.conn(),
                    error = %e,
                    "attack not relayed"
                ),
            }
        }
        ClientMessage::CreatedBoard(submission) => {
            let Some(game_id) = target_game(submission.game_id, peer) else {
                tracing::debug!(
                    conn_id = %peer.conn(),
                    "boards submitted while unbound"
                );
                return;
            };
            if let Err(e) = manager.submit_boards(
                peer,
                &game_id,
                submission.board1,
                submission.board2,
            ) {
                tracing::debug!(conn_id = %peer.conn(), error = %e, "boards rejected");
            }
        }
        ClientMessage::Unknown => {
            tracing::debug!(
                conn_id = %peer.conn(),
                "ignoring unknown message type"
            );
        }
    }
}

/// The game a board submission is for: the id it names, else the game the
/// connection is bound to.
fn target_game(named: Option<GameId>, peer: &Peer) -> Option<GameId> {
    named.or_else(|| peer.game().cloned())
}

#[cfg(test)]
mod tests {
    use broadside_transport::ConnectionId;

    use super::*;

    #[test]
    fn test_target_game_prefers_named_id() {
        let peer = Peer::new(ConnectionId::new(1));
        assert_eq!(
            target_game(Some(GameId::from("ab12cd34")), &peer),
            Some(GameId::from("ab12cd34"))
        );
    }

    #[test]
    fn test_target_game_unbound_without_id_is_none() {
        let peer = Peer::new(ConnectionId::new(1));
        assert_eq!(target_game(None, &peer), None);
    }
}
