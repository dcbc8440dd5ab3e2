//! Per-lane liveness records.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use parking_lot::Mutex;

/// Lane identifier → last-seen timestamp, written only by heartbeat frames.
///
/// Shared between the per-connection decode tasks and the liveness
/// monitor's periodic scan; one coarse lock covers both.
#[derive(Debug, Default)]
pub struct LivenessTable {
    inner: Mutex<HashMap<String, NaiveDateTime>>,
}

impl LivenessTable {
    /// Empty table; entries appear as lanes first heartbeat.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heartbeat for a lane.
    pub fn mark_seen(&self, lane_id: &str, seen_at: NaiveDateTime) {
        self.inner.lock().insert(lane_id.to_string(), seen_at);
    }

    /// Last-seen timestamp for one lane.
    #[must_use]
    pub fn last_seen(&self, lane_id: &str) -> Option<NaiveDateTime> {
        self.inner.lock().get(lane_id).copied()
    }

    /// Snapshot of the whole table for a monitor scan or a reporting read.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, NaiveDateTime> {
        self.inner.lock().clone()
    }
}
