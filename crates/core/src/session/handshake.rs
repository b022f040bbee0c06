//! One-shot auth handshake: hashed credentials in, live session out
//!
//! Exactly one handshake runs per channel, and the channel carries nothing
//! else until it succeeds. The reply seeds both the command catalog and
//! the initial collection snapshot.

use crate::auth;
use crate::error::{CoreError, Result};
use crate::transport::Connection;
use crate::types::{AuthCredential, ClientMessage, CommandCatalog, ServerMessage};

use super::Session;

/// Trade hashed credentials for an authenticated session.
///
/// The password is hashed with a fresh random salt; the plaintext never
/// leaves this function. Blocks for exactly one server reply.
pub async fn authenticate(
    mut connection: Connection,
    login: &str,
    password: &str,
) -> Result<Session> {
    let salt = auth::generate_salt();
    let credential = AuthCredential {
        login: login.to_string(),
        password_digest: auth::hash_password(password, Some(&salt)),
        salt: Some(salt.to_vec()),
    };

    connection.send(&ClientMessage::Auth(credential)).await?;

    match connection.recv::<ServerMessage>().await? {
        ServerMessage::AuthReply(reply) => {
            tracing::info!(
                login,
                commands = reply.command_catalog.len(),
                records = reply.initial_snapshot.len(),
                "authenticated"
            );
            Ok(Session::new(
                connection,
                CommandCatalog::new(reply.command_catalog),
                reply.initial_snapshot,
                login,
            ))
        }
        ServerMessage::AuthRejected { reason } => {
            tracing::warn!(login, %reason, "login rejected");
            Err(CoreError::InvalidCredentials)
        }
        other => Err(CoreError::Protocol(format!(
            "unexpected reply to handshake: {other:?}"
        ))),
    }
}
