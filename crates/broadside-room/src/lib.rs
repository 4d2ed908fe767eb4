//! Room membership and event delivery for Broadside.
//!
//! A room is a named multicast group; each game session owns exactly one,
//! named after its [`GameId`](broadside_protocol::GameId). The
//! [`RoomHub`] knows every live connection's outbound channel and which
//! rooms it has joined, and delivers [`ServerEvent`]s either to one
//! connection or to every member of a room.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← decides who hears what
//!     ↕
//! Room Layer (this crate)  ← membership + fan-out over mpsc
//!     ↕
//! Connection handlers  ← drain their channel onto the socket
//! ```
//!
//! [`ServerEvent`]: broadside_protocol::ServerEvent

mod hub;

pub use hub::{OutboundReceiver, OutboundSender, RoomHub, outbound_channel};
