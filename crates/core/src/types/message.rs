//! Wire messages exchanged with the server
//!
//! Four logical shapes cross the wire: `AuthCredential` and `Request` from
//! the client, `AuthReply` and `Response` from the server. Each direction
//! is wrapped in one enum so a single decode yields a typed message.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::{CommandCatalog, CommandDescriptor};
use super::record::Record;
use crate::error::{CoreError, Result};

/// Name of the full-state synchronization command (zero args, no record)
pub const SYNC_COMMAND: &str = "sync";
/// Server-side delete by record id (one arg, no record)
pub const REMOVE_KEY_COMMAND: &str = "remove_key";
/// Replace a record's fields, keeping its id and original owner
/// (one arg, record required)
pub const UPDATE_COMMAND: &str = "update";

/// Hashed login credentials sent during the handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthCredential {
    pub login: String,
    pub password_digest: Vec<u8>,
    pub salt: Option<Vec<u8>>,
}

/// Successful handshake reply: command catalog plus the initial replica
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthReply {
    pub command_catalog: BTreeMap<String, CommandDescriptor>,
    pub initial_snapshot: BTreeMap<i64, Record>,
}

/// One client request: a catalog command with its arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub command: String,
    pub args: Vec<String>,
    pub record: Option<Record>,
    pub login: String,
}

impl Request {
    /// Build the periodic synchronization request
    pub fn sync(login: &str) -> Self {
        Self {
            command: SYNC_COMMAND.to_string(),
            args: Vec::new(),
            record: None,
            login: login.to_string(),
        }
    }

    /// Build a request after checking its shape against the catalog
    /// descriptor. Shape mismatches are caller bugs and fail fast here
    /// instead of going to the server.
    pub fn checked(
        catalog: &CommandCatalog,
        command: &str,
        args: Vec<String>,
        record: Option<Record>,
        login: &str,
    ) -> Result<Self> {
        let descriptor = catalog
            .get(command)
            .ok_or_else(|| CoreError::UnknownCommand(command.to_string()))?;

        if args.len() != descriptor.arg_count {
            return Err(CoreError::ArgumentCount {
                command: command.to_string(),
                expected: descriptor.arg_count,
                got: args.len(),
            });
        }
        if descriptor.requires_record && record.is_none() {
            return Err(CoreError::RecordRequired(command.to_string()));
        }
        if !descriptor.requires_record && record.is_some() {
            return Err(CoreError::RecordUnexpected(command.to_string()));
        }

        Ok(Self {
            command: command.to_string(),
            args,
            record,
            login: login.to_string(),
        })
    }
}

/// One server reply. `collection_snapshot`, when present, is authoritative
/// and fully replaces the local replica.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub message: String,
    pub collection_snapshot: Option<BTreeMap<i64, Record>>,
}

/// Client → server wire envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    Auth(AuthCredential),
    Request(Request),
}

/// Server → client wire envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    AuthReply(AuthReply),
    AuthRejected { reason: String },
    Response(Response),
}
