//! Shared fixtures for the ingestion tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use gantry_push::{ClientRegistry, PushError, PushTransport, StrategyFilter};
use gantry_topology::Node;
use parking_lot::Mutex;
use serde_json::Value;

pub const LANE_ID: &str = "1F0100000000040101000001E7";
pub const STATION_ID: &str = "1F01000000000401";
pub const LANE_IP: &str = "127.0.0.1";

pub fn lane_node() -> Node {
    Node {
        id: LANE_ID.to_string(),
        name: "lane 01".to_string(),
        ip: LANE_IP.to_string(),
        node_type: 0,
        tran_mode: 0,
    }
}

/// Transport that records everything sent to it.
#[derive(Default)]
pub struct CaptureTransport {
    sent: Arc<Mutex<Vec<Value>>>,
}

impl CaptureTransport {
    pub fn new() -> (Self, Arc<Mutex<Vec<Value>>>) {
        let transport = Self::default();
        let sent = Arc::clone(&transport.sent);
        (transport, sent)
    }
}

#[async_trait]
impl PushTransport for CaptureTransport {
    async fn send(&mut self, payload: &Value) -> Result<(), PushError> {
        self.sent.lock().push(payload.clone());
        Ok(())
    }

    async fn close(&mut self) {}
}

/// Registers a capture client subscribed to the fixture station.
pub fn subscribed_registry() -> (Arc<ClientRegistry>, Arc<Mutex<Vec<Value>>>) {
    let registry = Arc::new(ClientRegistry::new());
    let (transport, sent) = CaptureTransport::new();
    let stations: HashSet<String> = [STATION_ID.to_string()].into_iter().collect();
    registry.register(stations, StrategyFilter::default(), Box::new(transport));
    (registry, sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_topology::NodeKind;

    // The static topology only admits nodes whose trailing id digit marks
    // them as lanes; the fixture must stay one.
    #[test]
    fn test_fixture_node_is_a_lane() {
        assert_eq!(lane_node().kind(), NodeKind::Lane);
        assert_eq!(&LANE_ID[..16], STATION_ID);
        assert_eq!(LANE_ID.len(), 26);
    }
}
