//! Game session management for Broadside.
//!
//! This crate owns everything the relay knows about games:
//!
//! 1. **Data model** — [`Session`] (player count and stored boards) and
//!    [`Peer`] (which game a connection is bound to)
//! 2. **Store** — [`SessionStore`], the id → session map and id generator
//! 3. **Lifecycle** — [`SessionManager`]: create, join, submit boards,
//!    broadcast boards, relay attacks, leave
//!
//! # How it fits in the stack
//!
//! ```text
//! Connection handler (above)  ← decodes requests, calls the manager
//!     ↕
//! Session Layer (this crate)  ← validates and mutates game state
//!     ↕
//! Room Layer (below)  ← delivers the resulting events
//! ```

mod error;
mod manager;
mod session;
mod store;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{MAX_PLAYERS, Peer, Session, SessionConfig};
pub use store::{GAME_ID_LEN, SessionStore};
