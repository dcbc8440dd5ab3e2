//! Client registry and event broadcaster.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gantry_proto::Event;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::Client;
use crate::envelope::Envelope;
use crate::filter::StrategyFilter;
use crate::transport::PushTransport;

/// Registry of live push clients.
///
/// Delivery takes a snapshot of matching clients under the map lock, then
/// writes outside it so one slow connection never stalls the others. A
/// failed write marks the client dead but leaves it registered; the per
/// client removal task spawned by [`ClientRegistry::register`] is the only
/// code path that takes a client out of the map, after its stop channel
/// fires.
#[derive(Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<Uuid, Arc<Client>>>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new client and spawns its removal task.
    pub fn register(
        self: &Arc<Self>,
        stations: HashSet<String>,
        filter: StrategyFilter,
        transport: Box<dyn PushTransport>,
    ) -> Arc<Client> {
        let (client, mut stop_rx) = Client::new(stations, filter, transport);
        let client = Arc::new(client);
        self.clients.lock().insert(client.id(), Arc::clone(&client));
        debug!(client_id = %client.id(), "push client registered");

        let registry = Arc::clone(self);
        let id = client.id();
        tokio::spawn(async move {
            if stop_rx.changed().await.is_ok() {
                registry.clients.lock().remove(&id);
                debug!(client_id = %id, "push client removed");
            }
        });

        client
    }

    /// Flags a client dead without removing it.
    pub fn mark_dead(&self, client: &Client) {
        client.mark_dead();
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// All currently registered clients, live or flagged dead.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Client>> {
        self.clients.lock().values().cloned().collect()
    }

    /// Fans one event out to every live client subscribed to its station.
    pub async fn deliver(&self, station_id: &str, event: &Event) {
        let targets: Vec<Arc<Client>> = self
            .clients
            .lock()
            .values()
            .filter(|c| c.is_alive() && c.subscribes_to(station_id))
            .cloned()
            .collect();

        for client in targets {
            let Some(payload) = payload_for(&client, event) else {
                continue;
            };
            if let Err(err) = client.write(&payload).await {
                warn!(
                    client_id = %client.id(),
                    station_id,
                    error = %err,
                    "push write failed, flagging client dead"
                );
                client.mark_dead();
                client.close_transport().await;
            }
        }
    }
}

/// Builds the enveloped payload for one client, or `None` when the client's
/// strategy suppresses this event.
fn payload_for(client: &Client, event: &Event) -> Option<Value> {
    let data = if event.is_alert() {
        if !client.filter().enabled(event.msg_type) {
            return None;
        }
        let mut annotated = event.clone();
        annotated.content.insert(
            "level".to_string(),
            Value::from(client.filter().level(event.msg_type)),
        );
        serde_json::to_value(annotated)
    } else {
        serde_json::to_value(event)
    };
    match data {
        Ok(data) => match serde_json::to_value(Envelope::ok(data)) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(error = %err, "envelope serialization failed");
                None
            }
        },
        Err(err) => {
            warn!(error = %err, "event serialization failed");
            None
        }
    }
}
