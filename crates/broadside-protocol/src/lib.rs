//! Wire protocol for Broadside.
//!
//! This crate defines what clients and the relay say to each other:
//!
//! - **Inbound** ([`ClientMessage`], [`Attack`], [`BoardSubmission`]) —
//!   `{ "type": ..., ...fields }` requests, decoded into typed values so
//!   nothing downstream ever handles an unchecked shape.
//! - **Outbound** ([`ServerEvent`], [`EventBody`]) — `{ "event", "message" }`
//!   frames unicast or multicast to session members.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — bytes ↔ values.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage / ServerEvent) → Session
//! ```

mod codec;
mod error;
mod inbound;
mod outbound;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use inbound::{Attack, BoardSubmission, ClientMessage};
pub use outbound::{EventBody, ServerEvent};
pub use types::{Board, GameId};
