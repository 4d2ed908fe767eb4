//! Unified error type for Broadside.

use broadside_protocol::ProtocolError;
use broadside_session::SessionError;
use broadside_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (not found, full, not a member).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid server configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
