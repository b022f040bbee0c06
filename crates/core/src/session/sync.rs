//! Periodic full-state synchronizer
//!
//! A background task that keeps the local replica fresh by submitting the
//! special sync request at a fixed period through the same exchange
//! primitive as everything else. It never outlives the connection: the
//! first failed exchange already moved the session to `Lost`, so the task
//! simply stops. Recovery is a new handshake, not a retry here.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::types::Request;

use super::Session;

impl Session {
    /// Spawn the synchronizer. The first sync fires immediately, then one
    /// every `period`. The handle resolves when the task stops (session
    /// lost or sync failed).
    pub fn spawn_sync(&self, period: Duration) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !session.is_connected() {
                    tracing::debug!("synchronizer stopping: session closed");
                    break;
                }
                match session.submit(Request::sync(session.login())).await {
                    Ok(response) => {
                        tracing::trace!(message = %response.message, "sync completed");
                    }
                    Err(err) => {
                        // The failing submit already performed the Lost
                        // transition and notified subscribers.
                        tracing::warn!("synchronizer stopping: {err}");
                        break;
                    }
                }
            }
        })
    }
}
