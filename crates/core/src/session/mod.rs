//! The session layer: serialized request/response over one live connection
//!
//! A `Session` owns the wire channel after a successful handshake and is
//! the only component allowed to touch it. Every producer - interactive
//! commands and the background synchronizer alike - goes through
//! `submit`, which holds an exclusive lock for the whole send/receive
//! round trip. The transport is one ordered duplex stream with no framing
//! beyond one-message-per-send, so interleaving two exchanges would pair
//! one caller's request with another caller's response.
//!
//! Connection state is a one-way machine: `Connected` until the first
//! transport failure, then `Lost` forever. Recovery is a fresh handshake
//! on a new channel, never an internal retry.

mod handshake;
mod sync;

pub use handshake::authenticate;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::error::{CoreError, Result};
use crate::store::CollectionStore;
use crate::types::message::UPDATE_COMMAND;
use crate::types::{
    ClientMessage, CommandCatalog, Record, Request, Response, ServerMessage,
};
use crate::transport::Connection;

/// Capacity of the notification channel; subscribers that fall this far
/// behind start losing the oldest events
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications the session pushes outward to presentation
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The local replica was atomically replaced with this snapshot
    CollectionReplaced(Arc<BTreeMap<i64, Record>>),
    /// The connection died; this session is permanently closed
    ConnectionLost,
}

struct SessionInner {
    /// The exchange lock. Waiters are woken in FIFO order, which is the
    /// only ordering guarantee between producers.
    channel: Mutex<Connection>,
    /// Edge-triggered Connected -> Lost flag
    lost: AtomicBool,
    catalog: CommandCatalog,
    store: CollectionStore,
    login: String,
    events: broadcast::Sender<SessionEvent>,
}

/// Handle to one authenticated session; cheap to clone, share freely
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub(crate) fn new(
        connection: Connection,
        catalog: CommandCatalog,
        initial_snapshot: BTreeMap<i64, Record>,
        login: &str,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                channel: Mutex::new(connection),
                lost: AtomicBool::new(false),
                catalog,
                store: CollectionStore::new(initial_snapshot),
                login: login.to_string(),
                events,
            }),
        }
    }

    /// The exchange primitive: at most one request is in flight on the
    /// channel at any time.
    ///
    /// Blocks until the lock is free, then runs a full send/receive round
    /// trip. On any transport failure the session transitions to `Lost`
    /// (emitting `ConnectionLost` exactly once across all callers) and the
    /// error propagates without retrying. Once `Lost`, every call fails
    /// immediately with `SessionClosed`.
    pub async fn submit(&self, request: Request) -> Result<Response> {
        if self.is_lost() {
            return Err(CoreError::SessionClosed);
        }

        let mut channel = self.inner.channel.lock().await;
        // The connection may have died while we waited for the lock
        if self.is_lost() {
            return Err(CoreError::SessionClosed);
        }

        tracing::debug!(command = %request.command, "submitting request");
        let exchange = async {
            channel.send(&ClientMessage::Request(request)).await?;
            channel.recv::<ServerMessage>().await
        }
        .await;

        // The lock guard stays alive to the end: the Lost transition must
        // complete before any waiter gets the channel.
        match exchange {
            Ok(ServerMessage::Response(response)) => {
                if let Some(snapshot) = response.collection_snapshot.clone() {
                    let image = self.inner.store.replace(snapshot);
                    tracing::debug!(records = image.len(), "collection replaced");
                    let _ = self
                        .inner
                        .events
                        .send(SessionEvent::CollectionReplaced(image));
                }
                Ok(response)
            }
            Ok(other) => {
                // A mis-typed reply means the stream framing can no longer
                // be trusted; treat it like a transport failure.
                self.mark_lost();
                Err(CoreError::Protocol(format!(
                    "unexpected server message: {other:?}"
                )))
            }
            Err(err) => {
                self.mark_lost();
                Err(err)
            }
        }
    }

    /// Build and submit a catalog command.
    ///
    /// Checks the argument shape against the catalog descriptor before
    /// anything touches the wire, validates any record payload, and stamps
    /// ownership: locally-built records belong to this session's login,
    /// except that `update` preserves the owner the record already has in
    /// the last known snapshot.
    pub async fn submit_command(
        &self,
        name: &str,
        args: Vec<String>,
        record: Option<Record>,
    ) -> Result<Response> {
        let record = match record {
            Some(mut record) => {
                record.validate()?;
                record.owner = self.inner.login.clone();
                if name == UPDATE_COMMAND {
                    if let Some(existing) = args
                        .first()
                        .and_then(|arg| arg.parse::<i64>().ok())
                        .and_then(|id| self.inner.store.get(id))
                    {
                        record.owner = existing.owner;
                    }
                }
                Some(record)
            }
            None => None,
        };

        let request = Request::checked(&self.inner.catalog, name, args, record, &self.inner.login)?;
        self.submit(request).await
    }

    /// Subscribe to collection-replaced and connection-lost notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// The command catalog received at login (read-only for the session's
    /// lifetime)
    pub fn catalog(&self) -> &CommandCatalog {
        &self.inner.catalog
    }

    /// The local replica of the server collection
    pub fn store(&self) -> &CollectionStore {
        &self.inner.store
    }

    /// Login this session authenticated as
    pub fn login(&self) -> &str {
        &self.inner.login
    }

    pub fn is_connected(&self) -> bool {
        !self.is_lost()
    }

    fn is_lost(&self) -> bool {
        self.inner.lost.load(Ordering::Acquire)
    }

    /// Connected -> Lost, exactly once. The first failing caller performs
    /// the transition and emits the notification; everyone else sees a
    /// closed session.
    fn mark_lost(&self) {
        if self
            .inner
            .lost
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::warn!("connection lost, session closed");
            let _ = self.inner.events.send(SessionEvent::ConnectionLost);
        }
    }
}
