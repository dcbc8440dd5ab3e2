//! Message categories, type codes, and the decoded event type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog code stamped on events synthesised from externally pushed
/// metrics. It never appears on the wire; the HTTP ingestion path is a
/// second producer into the same broadcaster.
pub const CATALOG_EXTERNAL: u8 = 22;

/// The single type code carried by heartbeat frames (and reused by the
/// liveness monitor's synthetic connectivity events).
pub const HEARTBEAT_TYPE: u8 = 0x22;

/// Top-level classification of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Lane transaction and duty records.
    Data,
    /// Operator alerts, gated per client by its strategy filter.
    Alert,
    /// Heartbeat/test traffic; feeds liveness, never delivered.
    Heartbeat,
}

impl Category {
    /// The wire code (value of the two ASCII-hex category characters).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Data => 0x01,
            Self::Alert => 0x20,
            Self::Heartbeat => 0x30,
        }
    }

    /// Map a wire code back to a category.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Data),
            0x20 => Some(Self::Alert),
            0x30 => Some(Self::Heartbeat),
            _ => None,
        }
    }
}

/// Type codes within the data category.
pub mod data {
    /// Entry-lane transaction record.
    pub const ENTRY_LANE: u8 = 0x10;
    /// Exit-lane transaction record.
    pub const EXIT_LANE: u8 = 0x11;
    /// Operator on-duty record.
    pub const ON_DUTY: u8 = 0x12;
    /// Entry-lane off-duty record.
    pub const ENTRY_OFF_DUTY: u8 = 0x13;
    /// Exit-lane off-duty record.
    pub const EXIT_OFF_DUTY: u8 = 0x14;
    /// Lane image captured.
    pub const IMAGE: u8 = 0x15;
    /// Lane voice traffic.
    pub const VOICE: u8 = 0x16;
    /// Lane open/closed status change.
    pub const LANE_STATUS: u8 = 0x17;
    /// Voucher payment.
    pub const VOUCHER: u8 = 0x18;
    /// Entry record query request.
    pub const ENTRY_QUERY: u8 = 0x19;
}

/// Type codes within the alert category.
pub mod alert {
    /// Entry/exit vehicle class mismatch.
    pub const CLASS_MISMATCH: u8 = 0x01;
    /// Vehicle ran the barrier.
    pub const VIOLATION: u8 = 0x02;
    /// Shift-end notice.
    pub const DUTY_END: u8 = 0x03;
    /// Entry/exit vehicle type mismatch.
    pub const TYPE_MISMATCH: u8 = 0x04;
    /// Entry card stock below threshold.
    pub const ENTRY_CARD_LOW: u8 = 0x05;
    /// Exit card stock above threshold.
    pub const EXIT_CARD_HIGH: u8 = 0x06;
    /// Printed-note stock below threshold.
    pub const NOTE_PRINT_LOW: u8 = 0x07;
    /// Hand-note stock below threshold.
    pub const NOTE_HAND_LOW: u8 = 0x08;
    /// Loop vehicle count.
    pub const VEHICLE_COUNT: u8 = 0x09;
    /// Card operation failed.
    pub const CARD_OP_FAIL: u8 = 0x0A;
    /// Card reader initialisation failed.
    pub const READER_INIT_FAIL: u8 = 0x0B;
    /// Card dispensing mode changed.
    pub const CARD_MODE_CHANGE: u8 = 0x0C;
    /// Note dispensing mode changed.
    pub const NOTE_MODE_CHANGE: u8 = 0x0D;
    /// Note reprinted.
    pub const NOTE_REPRINT: u8 = 0x0E;
    /// Unreadable card at exit.
    pub const EXIT_BAD_CARD: u8 = 0x0F;
    /// Missing card at exit.
    pub const EXIT_NO_CARD: u8 = 0x10;
    /// Simulated vehicle release.
    pub const SIMULATED_PASS: u8 = 0x11;
    /// Vehicle passed with unpaid debt.
    pub const DEBT: u8 = 0x12;
    /// Toll-free vehicle.
    pub const FREE_VEHICLE: u8 = 0x13;
    /// Transaction record amended.
    pub const FLOW_AMEND: u8 = 0x14;
    /// Convoy passage started.
    pub const CONVOY_START: u8 = 0x15;
    /// Convoy passage ended.
    pub const CONVOY_END: u8 = 0x16;
    /// Exit vehicle class amended.
    pub const EXIT_CLASS_AMEND: u8 = 0x17;
    /// Card reader fault.
    pub const READER_FAULT: u8 = 0x18;
    /// U-turn vehicle.
    pub const U_TURN: u8 = 0x19;
    /// Overtime vehicle.
    pub const OVERTIME: u8 = 0x20;
    /// Operator-raised alert.
    pub const MANUAL_ALERT: u8 = 0x21;
    /// ETC equipment information.
    pub const ETC_INFO: u8 = 0x22;
}

/// A decoded, immutable telemetry event: the unit handed to the broadcaster.
///
/// Serialised field names match what dashboard clients already consume.
/// `msg_content` preserves schema field order end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Wire category code, or [`CATALOG_EXTERNAL`] for synthesised events.
    #[serde(rename = "MsgCatalog")]
    pub catalog: u8,
    /// Type code within the catalog.
    #[serde(rename = "MsgType")]
    pub msg_type: u8,
    /// Formatted `YYYY-MM-DD HH:MM:SS` event timestamp.
    #[serde(rename = "MsgTime")]
    pub timestamp: String,
    /// Owning 26-character lane identifier.
    #[serde(rename = "MsgLane")]
    pub lane_id: String,
    /// Decoded fields in schema order.
    #[serde(rename = "MsgContent")]
    pub content: Map<String, Value>,
}

impl Event {
    /// The owning station: the first 16 characters of the lane identifier.
    ///
    /// The hierarchical node id encodes station/plaza/lane as nested
    /// fixed-width segments; decoding guarantees at least 16 characters.
    #[must_use]
    pub fn station_id(&self) -> &str {
        if self.lane_id.len() >= 16 {
            &self.lane_id[..16]
        } else {
            &self.lane_id
        }
    }

    /// True for alert-category events, which are subject to per-client
    /// strategy filtering.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.catalog == Category::Alert.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_codes_round_trip() {
        for category in [Category::Data, Category::Alert, Category::Heartbeat] {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
        assert_eq!(Category::from_code(0x7F), None);
    }

    #[test]
    fn test_event_station_prefix() {
        let event = Event {
            catalog: Category::Data.code(),
            msg_type: data::ENTRY_LANE,
            timestamp: "2024-01-01 12:00:00".to_string(),
            lane_id: "1F010000000004011010101010".to_string(),
            content: Map::new(),
        };
        assert_eq!(event.station_id(), "1F01000000000401");
    }

    #[test]
    fn test_event_wire_names() {
        let mut content = Map::new();
        content.insert("Shift".to_string(), json!(1));
        let event = Event {
            catalog: Category::Alert.code(),
            msg_type: alert::VIOLATION,
            timestamp: "2024-01-01 12:00:00".to_string(),
            lane_id: "A".repeat(26),
            content,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["MsgCatalog"], json!(0x20));
        assert_eq!(value["MsgContent"]["Shift"], json!(1));
    }
}
