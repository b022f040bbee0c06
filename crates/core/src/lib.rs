//! Flatlink Core - Client session layer for a server-replicated collection
//!
//! This crate provides:
//! - Domain types (records, command catalog, wire messages)
//! - Protocol handling (Postcard serialization)
//! - TCP wire channel with bounded receive waits
//! - The Session exchange primitive and connection state machine
//! - Periodic full-state synchronizer
//! - Credential hashing for the auth handshake

/// Default period between background synchronization requests
pub const SYNC_PERIOD_SECS: u64 = 5;

pub mod auth;
pub mod error;
pub mod protocol;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

// Re-export common types
pub use error::{CoreError, Result};
pub use protocol::MessageCodec;
pub use session::{authenticate, Session, SessionEvent};
pub use store::CollectionStore;
pub use transport::{ChannelConfig, Connection};
pub use types::{
    AuthCredential, AuthReply, ClientMessage, CommandCatalog, CommandDescriptor, Record, Request,
    Response, ServerMessage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_period_defined() {
        assert_eq!(SYNC_PERIOD_SECS, 5);
    }
}
