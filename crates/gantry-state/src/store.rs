//! The lane state store.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use gantry_topology::{station_prefix, Node};

/// Mutable projection of one lane's operational state.
///
/// Created at topology load; mutated by decoder side effects and the
/// liveness monitor.
#[derive(Debug, Clone, Serialize)]
pub struct LaneInfo {
    /// The lane's immutable node identity.
    pub node: Node,
    /// Projection fields: connection status, duty flags, shift number,
    /// operator id/name, lane status code.
    pub info: Map<String, Value>,
}

impl LaneInfo {
    fn new(node: Node) -> Self {
        let mut info = Map::new();
        // Lanes start out presumed connected; the liveness monitor flips
        // this once heartbeats actually go stale.
        info.insert("ConnectStatus".to_string(), Value::from(true));
        Self { node, info }
    }

    /// The lane's current connection flag.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.info
            .get("ConnectStatus")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Externally sourced metric projection for one lane.
#[derive(Debug, Clone, Serialize)]
pub struct CoreData {
    /// The lane's immutable node identity.
    pub node: Node,
    /// Latest value per allow-listed metric.
    #[serde(rename = "coreData")]
    pub core_data: Map<String, Value>,
}

/// Concurrency-safe map of per-lane projections.
///
/// Single-writer-at-a-time per key via one coarse lock per projection map.
/// Station-scoped reads are linear scans over the 16-character prefix,
/// which is fine at toll-network cardinality.
#[derive(Debug, Default)]
pub struct LaneStateStore {
    lanes: RwLock<HashMap<String, LaneInfo>>,
    core: RwLock<HashMap<String, CoreData>>,
}

impl LaneStateStore {
    /// Create a store seeded with one entry per lane node.
    #[must_use]
    pub fn seeded(lane_nodes: &[Node]) -> Self {
        let store = Self::default();
        {
            let mut lanes = store.lanes.write();
            let mut core = store.core.write();
            for node in lane_nodes {
                lanes.insert(node.id.clone(), LaneInfo::new(node.clone()));
                core.insert(
                    node.id.clone(),
                    CoreData {
                        node: node.clone(),
                        core_data: Map::new(),
                    },
                );
            }
        }
        store
    }

    /// Snapshot one lane's projection.
    #[must_use]
    pub fn lane(&self, lane_id: &str) -> Option<LaneInfo> {
        self.lanes.read().get(lane_id).cloned()
    }

    /// Merge one field into a lane's projection. Unknown lanes are ignored
    /// (the wire can name lanes the topology has never heard of).
    pub fn update_field(&self, lane_id: &str, key: &str, value: Value) {
        let mut lanes = self.lanes.write();
        if let Some(entry) = lanes.get_mut(lane_id) {
            entry.info.insert(key.to_string(), value);
        } else {
            debug!(lane = lane_id, key, "lane update for unknown lane dropped");
        }
    }

    /// Snapshot every lane projection under a station prefix.
    #[must_use]
    pub fn lanes_by_station(&self, station_id: &str) -> Vec<LaneInfo> {
        let prefix = station_prefix(station_id);
        self.lanes
            .read()
            .iter()
            .filter(|(lane_id, _)| station_prefix(lane_id) == prefix)
            .map(|(_, info)| info.clone())
            .collect()
    }

    /// Merge one metric value into a lane's core-data projection.
    pub fn update_core_field(&self, lane_id: &str, key: &str, value: Value) {
        let mut core = self.core.write();
        if let Some(entry) = core.get_mut(lane_id) {
            entry.core_data.insert(key.to_string(), value);
        } else {
            debug!(lane = lane_id, key, "core update for unknown lane dropped");
        }
    }

    /// Snapshot every core-data projection under a station prefix.
    #[must_use]
    pub fn core_by_station(&self, station_id: &str) -> Vec<CoreData> {
        let prefix = station_prefix(station_id);
        self.core
            .read()
            .iter()
            .filter(|(lane_id, _)| station_prefix(lane_id) == prefix)
            .map(|(_, data)| data.clone())
            .collect()
    }

    /// Number of known lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lane_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            name: "lane".to_string(),
            ip: "10.0.0.1".to_string(),
            node_type: 0,
            tran_mode: 0,
        }
    }

    const LANE_A: &str = "1F0100000000040101000001E7";
    const LANE_B: &str = "1F0100000000040101000002E7";
    const LANE_OTHER: &str = "1F0100000000050201000001E7";

    fn store() -> LaneStateStore {
        LaneStateStore::seeded(&[lane_node(LANE_A), lane_node(LANE_B), lane_node(LANE_OTHER)])
    }

    #[test]
    fn test_seeded_lanes_start_connected() {
        let store = store();
        assert_eq!(store.lane_count(), 3);
        assert!(store.lane(LANE_A).unwrap().connected());
    }

    #[test]
    fn test_update_field_merges() {
        let store = store();
        store.update_field(LANE_A, "shiftNo", json!(2));
        store.update_field(LANE_A, "empName", json!("张三"));
        let info = store.lane(LANE_A).unwrap();
        assert_eq!(info.info["shiftNo"], json!(2));
        assert_eq!(info.info["empName"], json!("张三"));
        // Untouched field survives the merge.
        assert!(info.connected());
    }

    #[test]
    fn test_unknown_lane_update_is_dropped() {
        let store = store();
        store.update_field("9F0100000000040101000001E7", "shiftNo", json!(1));
        assert_eq!(store.lane_count(), 3);
    }

    #[test]
    fn test_station_scan_filters_by_prefix() {
        let store = store();
        let same_station = store.lanes_by_station(LANE_A);
        assert_eq!(same_station.len(), 2);
        let other = store.lanes_by_station(LANE_OTHER);
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_core_data_round_trip() {
        let store = store();
        store.update_core_field(LANE_A, "cpu.idle", json!(93.5));
        let data = store.core_by_station(LANE_A);
        let entry = data.iter().find(|d| d.node.id == LANE_A).unwrap();
        assert_eq!(entry.core_data["cpu.idle"], json!(93.5));
    }
}
