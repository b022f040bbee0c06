//! Error types for flatlink-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed: invalid credentials")]
    InvalidCredentials,

    #[error("Hash algorithm unavailable: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Session closed: connection was lost")]
    SessionClosed,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command {command} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("Command {0} requires a record payload")]
    RecordRequired(String),

    #[error("Command {0} does not take a record payload")]
    RecordUnexpected(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;
