//! One registered push consumer.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::error::PushError;
use crate::filter::StrategyFilter;
use crate::transport::PushTransport;

/// A registered push client: its subscriptions, its alert strategy, and the
/// write side of its connection.
///
/// `alive` is the liveness flag flipped by failed writes and heartbeat
/// probes; removal from the registry happens only after the stop channel is
/// signalled. Writes take the transport lock so concurrent broadcast and
/// heartbeat sends never interleave on the wire.
pub struct Client {
    id: Uuid,
    stations: HashSet<String>,
    filter: StrategyFilter,
    alive: AtomicBool,
    transport: Mutex<Box<dyn PushTransport>>,
    stop_tx: watch::Sender<bool>,
}

impl Client {
    pub(crate) fn new(
        stations: HashSet<String>,
        filter: StrategyFilter,
        transport: Box<dyn PushTransport>,
    ) -> (Self, watch::Receiver<bool>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            Self {
                id: Uuid::new_v4(),
                stations,
                filter,
                alive: AtomicBool::new(true),
                transport: Mutex::new(transport),
                stop_tx,
            },
            stop_rx,
        )
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn filter(&self) -> &StrategyFilter {
        &self.filter
    }

    #[must_use]
    pub fn subscribes_to(&self, station_id: &str) -> bool {
        self.stations.contains(station_id)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Flags the client dead. Idempotent; the client stays registered until
    /// the heartbeat service signals its stop channel.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Tells the registry's removal task to drop this client.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Writes one payload under the transport lock.
    pub async fn write(&self, payload: &Value) -> Result<(), PushError> {
        self.transport.lock().await.send(payload).await
    }

    /// Closes the underlying connection.
    pub async fn close_transport(&self) {
        self.transport.lock().await.close().await;
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("stations", &self.stations)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
