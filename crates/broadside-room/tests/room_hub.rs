//! Integration tests for room membership and fan-out.

use broadside_protocol::{GameId, ServerEvent};
use broadside_room::{OutboundReceiver, RoomHub, outbound_channel};
use broadside_transport::ConnectionId;

// =========================================================================
// Helpers
// =========================================================================

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn room(name: &str) -> GameId {
    GameId::from(name)
}

/// Registers a connection and hands back the receiving end so the test
/// can observe what the hub delivered.
fn register(hub: &mut RoomHub, id: u64) -> OutboundReceiver {
    let (tx, rx) = outbound_channel();
    hub.register(cid(id), tx);
    rx
}

/// Drains everything currently queued on a receiver.
fn drain(rx: &mut OutboundReceiver) -> Vec<ServerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

// =========================================================================
// Unicast
// =========================================================================

#[test]
fn test_send_to_reaches_only_target() {
    let mut hub = RoomHub::new();
    let mut rx1 = register(&mut hub, 1);
    let mut rx2 = register(&mut hub, 2);

    hub.send_to(cid(1), ServerEvent::member_removed(0));

    assert_eq!(drain(&mut rx1), vec![ServerEvent::member_removed(0)]);
    assert!(drain(&mut rx2).is_empty());
}

#[test]
fn test_send_to_unknown_connection_is_dropped() {
    let hub = RoomHub::new();
    // No panic, nothing to observe.
    hub.send_to(cid(99), ServerEvent::member_removed(0));
}

#[test]
fn test_send_to_closed_receiver_is_dropped() {
    let mut hub = RoomHub::new();
    let rx = register(&mut hub, 1);
    drop(rx);

    hub.send_to(cid(1), ServerEvent::member_removed(0));
}

// =========================================================================
// Multicast
// =========================================================================

#[test]
fn test_broadcast_reaches_all_members_including_sender() {
    let mut hub = RoomHub::new();
    let mut rx1 = register(&mut hub, 1);
    let mut rx2 = register(&mut hub, 2);
    let mut rx3 = register(&mut hub, 3);
    hub.join(cid(1), &room("ab12cd34"));
    hub.join(cid(2), &room("ab12cd34"));

    let event = ServerEvent::member_added(&room("ab12cd34"), 2);
    hub.broadcast(&room("ab12cd34"), event.clone());

    assert_eq!(drain(&mut rx1), vec![event.clone()]);
    assert_eq!(drain(&mut rx2), vec![event]);
    assert!(drain(&mut rx3).is_empty(), "non-member must not hear it");
}

#[test]
fn test_broadcast_preserves_order_per_connection() {
    let mut hub = RoomHub::new();
    let mut rx = register(&mut hub, 1);
    let game = room("ab12cd34");
    hub.join(cid(1), &game);

    hub.send_to(cid(1), ServerEvent::join_successful(&game));
    hub.broadcast(&game, ServerEvent::member_added(&game, 1));
    hub.broadcast(&game, ServerEvent::subscription_succeeded(&game, 1, &[]));

    let events: Vec<String> =
        drain(&mut rx).into_iter().map(|e| e.event).collect();
    assert_eq!(
        events,
        vec![
            "join_successful",
            "ab12cd34:member_added",
            "ab12cd34:subscription_succeeded",
        ]
    );
}

#[test]
fn test_broadcast_to_unknown_room_is_noop() {
    let mut hub = RoomHub::new();
    let mut rx = register(&mut hub, 1);

    hub.broadcast(&room("nothere1"), ServerEvent::member_removed(0));

    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_rooms_are_isolated() {
    let mut hub = RoomHub::new();
    let mut rx1 = register(&mut hub, 1);
    let mut rx2 = register(&mut hub, 2);
    hub.join(cid(1), &room("aaaaaaaa"));
    hub.join(cid(2), &room("bbbbbbbb"));

    hub.broadcast(&room("aaaaaaaa"), ServerEvent::member_removed(1));

    assert_eq!(drain(&mut rx1).len(), 1);
    assert!(drain(&mut rx2).is_empty());
}

// =========================================================================
// Membership
// =========================================================================

#[test]
fn test_join_twice_is_single_membership() {
    let mut hub = RoomHub::new();
    let mut rx = register(&mut hub, 1);
    hub.join(cid(1), &room("ab12cd34"));
    hub.join(cid(1), &room("ab12cd34"));

    hub.broadcast(&room("ab12cd34"), ServerEvent::member_removed(0));

    assert_eq!(drain(&mut rx).len(), 1, "no duplicate delivery");
    assert_eq!(hub.members(&room("ab12cd34")), vec![cid(1)]);
}

#[test]
fn test_leave_stops_delivery_and_drops_empty_room() {
    let mut hub = RoomHub::new();
    let mut rx = register(&mut hub, 1);
    hub.join(cid(1), &room("ab12cd34"));
    assert_eq!(hub.room_count(), 1);

    hub.leave(cid(1), &room("ab12cd34"));
    hub.broadcast(&room("ab12cd34"), ServerEvent::member_removed(0));

    assert!(drain(&mut rx).is_empty());
    assert!(!hub.is_member(cid(1), &room("ab12cd34")));
    assert_eq!(hub.room_count(), 0);
}

#[test]
fn test_unregister_removes_from_every_room() {
    let mut hub = RoomHub::new();
    let _rx1 = register(&mut hub, 1);
    let _rx2 = register(&mut hub, 2);
    hub.join(cid(1), &room("aaaaaaaa"));
    hub.join(cid(1), &room("bbbbbbbb"));
    hub.join(cid(2), &room("bbbbbbbb"));

    hub.unregister(cid(1));

    assert_eq!(hub.connection_count(), 1);
    assert!(!hub.is_member(cid(1), &room("bbbbbbbb")));
    assert_eq!(hub.members(&room("bbbbbbbb")), vec![cid(2)]);
    assert_eq!(hub.room_count(), 1, "room aaaaaaaa became empty");
}

#[test]
fn test_event_body_survives_fan_out() {
    let mut hub = RoomHub::new();
    let mut rx = register(&mut hub, 1);
    let game = room("ab12cd34");
    hub.join(cid(1), &game);

    let board = serde_json::json!({ "cells": [0, 1, 2] });
    hub.broadcast(&game, ServerEvent::boards(&game, Some(&board), None));

    let events = drain(&mut rx);
    let json = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(json["message"]["board1"]["cells"][2], 2);
    assert!(json["message"]["board2"].is_null());
}
