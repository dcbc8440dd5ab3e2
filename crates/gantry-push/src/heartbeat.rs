//! Periodic client heartbeat probes and dead-client reaping.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

use crate::registry::ClientRegistry;

/// Probes every registered client on a fixed cadence.
///
/// A live client gets a bare `0` written to its transport; a failed probe
/// marks it dead, closes the connection, and signals its stop channel. A
/// client already flagged dead (by a failed broadcast write) is signalled
/// without another probe. Removal itself happens in the registry's per
/// client task, so a client is never dropped mid-delivery.
pub struct HeartbeatService {
    registry: Arc<ClientRegistry>,
    period: Duration,
}

impl HeartbeatService {
    #[must_use]
    pub fn new(registry: Arc<ClientRegistry>, period: Duration) -> Self {
        Self { registry, period }
    }

    /// Runs until the shutdown channel fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        info!(period_secs = self.period.as_secs(), "client heartbeat service started");
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep().await,
                _ = shutdown.changed() => {
                    info!("client heartbeat service stopping");
                    break;
                }
            }
        }
    }

    /// One pass over the registry.
    pub async fn sweep(&self) {
        let probe = Value::from(0);
        for client in self.registry.snapshot() {
            if client.is_alive() {
                if let Err(err) = client.write(&probe).await {
                    debug!(client_id = %client.id(), error = %err, "heartbeat probe failed");
                    client.mark_dead();
                    client.close_transport().await;
                    client.signal_stop();
                }
            } else {
                client.signal_stop();
            }
        }
    }
}
