//! Heartbeat staleness monitor.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use gantry_proto::{Category, Event, HEARTBEAT_TYPE, TIME_LAYOUT};
use gantry_push::ClientRegistry;
use gantry_state::{LaneStateStore, LivenessTable};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

/// Watches last-seen heartbeat times and synthesizes connect-status events.
///
/// Emits only on transitions: a lane that stays stale (or stays fresh)
/// across polls produces nothing. The synthesized event reuses the
/// heartbeat catalog and type so consumers handle it like any other frame.
pub struct LivenessMonitor {
    liveness: Arc<LivenessTable>,
    store: Arc<LaneStateStore>,
    registry: Arc<ClientRegistry>,
    poll: Duration,
    stale_after: chrono::Duration,
}

impl LivenessMonitor {
    #[must_use]
    pub fn new(
        liveness: Arc<LivenessTable>,
        store: Arc<LaneStateStore>,
        registry: Arc<ClientRegistry>,
        poll: Duration,
        stale_after: chrono::Duration,
    ) -> Self {
        Self {
            liveness,
            store,
            registry,
            poll,
            stale_after,
        }
    }

    /// Runs until the shutdown channel fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.poll);
        info!(
            poll = ?self.poll,
            stale_secs = self.stale_after.num_seconds(),
            "lane liveness monitor started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep(chrono::Local::now().naive_local()).await;
                }
                _ = shutdown.changed() => {
                    info!("lane liveness monitor stopping");
                    break;
                }
            }
        }
    }

    /// One pass over the liveness table at the given instant.
    pub async fn sweep(&self, now: NaiveDateTime) {
        for (lane_id, last_seen) in self.liveness.snapshot() {
            let connected = now - last_seen <= self.stale_after;
            let Some(lane) = self.store.lane(&lane_id) else {
                // Heartbeats from lanes outside the topology carry no state.
                debug!(%lane_id, "heartbeat from unknown lane ignored");
                continue;
            };
            if lane.connected() == connected {
                continue;
            }
            info!(%lane_id, connected, "lane connect status changed");
            self.store
                .update_field(&lane_id, "ConnectStatus", Value::from(connected));

            let mut content = Map::new();
            content.insert("ConnectStatus".to_string(), Value::from(connected));
            let event = Event {
                catalog: Category::Heartbeat.code(),
                msg_type: HEARTBEAT_TYPE,
                timestamp: last_seen.format(TIME_LAYOUT).to_string(),
                lane_id: lane_id.clone(),
                content,
            };
            self.registry.deliver(event.station_id(), &event).await;
        }
    }
}
