//! External metric push ingestion.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use gantry_proto::{CATALOG_EXTERNAL, Event, TIME_LAYOUT};
use gantry_push::ClientRegistry;
use gantry_state::LaneStateStore;
use gantry_topology::TopologyResolver;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One metric sample as posted by the external collector.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricValue {
    /// Source device address; resolved to a lane through the topology.
    pub endpoint: String,
    pub metric: String,
    pub value: f64,
    #[serde(default)]
    pub step: i64,
    #[serde(default, rename = "counterType")]
    pub counter_type: String,
    #[serde(default)]
    pub tags: String,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Applies pushed metric batches to the core-data projection and fans
/// allow-listed samples out as external events.
///
/// The allow-list maps each accepted metric name to the synthetic type
/// code stamped on the event it produces.
pub struct MetricIngestor {
    topology: Arc<dyn TopologyResolver>,
    store: Arc<LaneStateStore>,
    registry: Arc<ClientRegistry>,
    allowed: HashMap<String, u8>,
}

impl MetricIngestor {
    #[must_use]
    pub fn new(
        topology: Arc<dyn TopologyResolver>,
        store: Arc<LaneStateStore>,
        registry: Arc<ClientRegistry>,
        allowed: HashMap<String, u8>,
    ) -> Self {
        Self {
            topology,
            store,
            registry,
            allowed,
        }
    }

    /// Ingests one pushed batch. Samples for unlisted metrics or unknown
    /// endpoints are dropped; the rest update state and are broadcast.
    pub async fn ingest(&self, batch: Vec<MetricValue>) {
        for sample in batch {
            let Some(&msg_type) = self.allowed.get(&sample.metric) else {
                debug!(metric = %sample.metric, "metric not allow-listed, dropped");
                continue;
            };
            let Some(node) = self.topology.node_by_ip(&sample.endpoint) else {
                warn!(
                    endpoint = %sample.endpoint,
                    metric = %sample.metric,
                    "metric from unknown endpoint dropped"
                );
                continue;
            };
            self.store
                .update_core_field(&node.id, &sample.metric, Value::from(sample.value));

            let timestamp = DateTime::from_timestamp(sample.timestamp, 0)
                .map_or_else(
                    || chrono::Local::now().naive_local(),
                    |dt| dt.naive_local(),
                )
                .format(TIME_LAYOUT)
                .to_string();
            let mut content = Map::new();
            content.insert(sample.metric.clone(), Value::from(sample.value));
            let event = Event {
                catalog: CATALOG_EXTERNAL,
                msg_type,
                timestamp,
                lane_id: node.id.clone(),
                content,
            };
            self.registry.deliver(event.station_id(), &event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{LANE_ID, LANE_IP, lane_node, subscribed_registry};
    use gantry_topology::StaticTopology;

    fn sample(endpoint: &str, metric: &str, value: f64) -> MetricValue {
        MetricValue {
            endpoint: endpoint.to_string(),
            metric: metric.to_string(),
            value,
            step: 60,
            counter_type: "GAUGE".to_string(),
            tags: String::new(),
            timestamp: 1_704_110_400,
        }
    }

    fn ingestor() -> (
        MetricIngestor,
        Arc<LaneStateStore>,
        Arc<parking_lot::Mutex<Vec<Value>>>,
    ) {
        let topology = Arc::new(StaticTopology::new(vec![lane_node()]).unwrap());
        let store = Arc::new(LaneStateStore::seeded(&topology.lanes()));
        let (registry, sent) = subscribed_registry();
        let allowed: HashMap<String, u8> = [("cpu.idle".to_string(), 0x17)].into_iter().collect();
        let ingestor = MetricIngestor::new(topology, Arc::clone(&store), registry, allowed);
        (ingestor, store, sent)
    }

    #[tokio::test]
    async fn test_allow_listed_metric_updates_core_and_broadcasts() {
        let (ingestor, store, sent) = ingestor();

        ingestor.ingest(vec![sample(LANE_IP, "cpu.idle", 93.5)]).await;

        let core = store.core_by_station("1F01000000000401");
        assert_eq!(core.len(), 1);
        assert_eq!(core[0].core_data["cpu.idle"], Value::from(93.5));

        let sent = sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["data"]["MsgCatalog"], i32::from(CATALOG_EXTERNAL));
        // The event carries the type code configured for this metric and
        // keys its content by the metric name.
        assert_eq!(sent[0]["data"]["MsgType"], 0x17);
        assert_eq!(sent[0]["data"]["MsgContent"]["cpu.idle"], 93.5);
    }

    #[tokio::test]
    async fn test_unlisted_metric_dropped() {
        let (ingestor, store, sent) = ingestor();

        ingestor.ingest(vec![sample(LANE_IP, "disk.free", 10.0)]).await;

        assert!(store.core_by_station("1F01000000000401")[0].core_data.is_empty());
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_endpoint_dropped() {
        let (ingestor, store, sent) = ingestor();

        ingestor
            .ingest(vec![sample("10.9.9.9", "cpu.idle", 50.0)])
            .await;

        assert!(store.core_by_station("1F01000000000401")[0].core_data.is_empty());
        assert!(sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_batch_mixes_kept_and_dropped() {
        let (ingestor, store, sent) = ingestor();

        ingestor
            .ingest(vec![
                sample(LANE_IP, "cpu.idle", 93.5),
                sample(LANE_IP, "disk.free", 10.0),
            ])
            .await;

        let core = store.core_by_station("1F01000000000401");
        assert_eq!(core[0].core_data.len(), 1);
        assert_eq!(sent.lock().len(), 1);
    }
}
