//! Frame-to-fanout pipeline shared by every ingestion surface.

use std::sync::Arc;

use chrono::NaiveDateTime;
use gantry_proto::{Decoded, Event, RawFrame, SideEffect, TIME_LAYOUT, decode};
use gantry_push::ClientRegistry;
use gantry_state::{LaneStateStore, LivenessTable};
use serde_json::Value;
use tracing::{debug, warn};

/// Applies decoded frames to the shared state and fans events out.
///
/// Malformed frames are dropped with a warning; frames of an unknown
/// message type are skipped quietly since field devices emit types this
/// service does not track. Either way the connection stays up.
pub struct EventPipeline {
    store: Arc<LaneStateStore>,
    liveness: Arc<LivenessTable>,
    registry: Arc<ClientRegistry>,
}

impl EventPipeline {
    #[must_use]
    pub fn new(
        store: Arc<LaneStateStore>,
        liveness: Arc<LivenessTable>,
        registry: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            store,
            liveness,
            registry,
        }
    }

    /// Decodes one raw frame and routes the result.
    pub async fn handle_frame(&self, frame: &RawFrame) {
        match decode(frame) {
            Ok(Decoded::Heartbeat { lane_id, timestamp }) => {
                self.handle_heartbeat(&lane_id, &timestamp);
            }
            Ok(Decoded::Event { event, side_effect }) => {
                self.apply_side_effect(&event, side_effect);
                self.registry.deliver(event.station_id(), &event).await;
            }
            Err(err) if err.is_unknown_message() => {
                debug!(error = %err, "skipping frame of untracked message type");
            }
            Err(err) => {
                warn!(error = %err, len = frame.body().len(), "dropping malformed frame");
            }
        }
    }

    fn handle_heartbeat(&self, lane_id: &str, timestamp: &str) {
        let seen_at = NaiveDateTime::parse_from_str(timestamp, TIME_LAYOUT).unwrap_or_else(|_| {
            debug!(lane_id, timestamp, "unparseable heartbeat timestamp, using local clock");
            chrono::Local::now().naive_local()
        });
        self.liveness.mark_seen(lane_id, seen_at);
    }

    /// Projects a decoded event onto the lane state store.
    fn apply_side_effect(&self, event: &Event, side_effect: SideEffect) {
        let lane_id = &event.lane_id;
        match side_effect {
            SideEffect::None => {}
            SideEffect::OnDuty => {
                self.store
                    .update_field(lane_id, "shiftStatus", Value::from(true));
                self.store
                    .update_field(lane_id, "onDutyTime", Value::from(event.timestamp.clone()));
                self.copy_fields(event, &[("Shift", "shiftNo"), ("EmpID", "empID"), ("EmpName", "empName")]);
            }
            SideEffect::OffDuty => {
                self.store
                    .update_field(lane_id, "shiftStatus", Value::from(false));
                self.store
                    .update_field(lane_id, "offDutyTime", Value::from(event.timestamp.clone()));
                self.copy_fields(event, &[("Shift", "shiftNo"), ("EmpID", "empID"), ("EmpName", "empName")]);
            }
            SideEffect::LaneStatus => {
                if let Some(status) = event.content.get("Status") {
                    self.store
                        .update_field(lane_id, "laneStatus", status.clone());
                }
            }
            SideEffect::Passage => {
                self.copy_fields(event, &[("Shift", "shiftNo"), ("EmpID", "empID")]);
            }
        }
    }

    fn copy_fields(&self, event: &Event, mappings: &[(&str, &str)]) {
        for (from, to) in mappings {
            if let Some(value) = event.content.get(*from) {
                self.store.update_field(&event.lane_id, to, value.clone());
            }
        }
    }
}
