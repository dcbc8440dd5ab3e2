//! Frame decoding: `RawFrame` → typed event.

use serde_json::{Map, Value};

use crate::codec;
use crate::error::{ProtoError, Result};
use crate::frame::RawFrame;
use crate::message::{Category, Event, HEARTBEAT_TYPE};
use crate::schema::{self, FieldKind, SideEffect, LANE_ID_WIDTH, TIMESTAMP_WIDTH};

/// Outcome of decoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A deliverable event plus the shared-state mutation it mandates.
    Event {
        /// The immutable decoded event.
        event: Event,
        /// Lane-state mutation descriptor from the schema table.
        side_effect: SideEffect,
    },
    /// A heartbeat: updates the lane liveness record, never delivered.
    Heartbeat {
        /// Reporting lane.
        lane_id: String,
        /// Formatted heartbeat timestamp.
        timestamp: String,
    },
}

/// Decode a complete frame.
///
/// Total for any frame whose category and type codes are registered in the
/// schema table. Unknown (category, type) pairs surface as
/// [`ProtoError::UnknownMessage`]/[`ProtoError::UnknownCategory`], which the
/// pipeline treats as a logged skip; every other error is a malformed frame.
/// Neither closes the connection.
pub fn decode(frame: &RawFrame) -> Result<Decoded> {
    let body = frame.body();
    if body.len() < 4 + TIMESTAMP_WIDTH + LANE_ID_WIDTH {
        return Err(ProtoError::ShortFrame { len: body.len() });
    }

    let catalog = codec::hex_int(&body[0..2], "MsgCatalog")? as u8;
    let msg_type = codec::hex_int(&body[2..4], "MsgType")? as u8;
    let category = Category::from_code(catalog).ok_or(ProtoError::UnknownCategory(catalog))?;

    let mut cursor = Cursor::new(&body[4..]);
    let timestamp = codec::format_timestamp(cursor.take(TIMESTAMP_WIDTH, "MsgTime")?)?;
    let lane_id = codec::ascii_text(cursor.take(LANE_ID_WIDTH, "MsgLane")?, "MsgLane")?;

    if category == Category::Heartbeat {
        if msg_type != HEARTBEAT_TYPE {
            return Err(ProtoError::UnknownMessage { category: catalog, msg_type });
        }
        return Ok(Decoded::Heartbeat { lane_id, timestamp });
    }

    let schema = schema::schema_for(category, msg_type)
        .ok_or(ProtoError::UnknownMessage { category: catalog, msg_type })?;

    let mut content = Map::new();
    for field in schema.fields {
        let raw = cursor.take(field.width, field.name)?;
        let value = match field.kind {
            FieldKind::HexInt => Value::from(codec::hex_int(raw, field.name)?),
            FieldKind::Timestamp => Value::from(codec::format_timestamp(raw)?),
            FieldKind::Text => Value::from(codec::ascii_text(raw, field.name)?),
            FieldKind::GbkText => Value::from(codec::gbk_text(raw, field.name)?),
        };
        content.insert(field.name.to_string(), value);
    }

    finalize_content(schema.side_effect, &timestamp, &mut content);

    Ok(Decoded::Event {
        event: Event {
            catalog,
            msg_type,
            timestamp,
            lane_id,
            content,
        },
        side_effect: schema.side_effect,
    })
}

/// Content adjustments tied to a side effect but visible in the delivered
/// event itself.
fn finalize_content(side_effect: SideEffect, timestamp: &str, content: &mut Map<String, Value>) {
    match side_effect {
        SideEffect::OnDuty => {
            content.insert("onDutyTime".to_string(), Value::from(timestamp));
        }
        SideEffect::LaneStatus => {
            // Wire status 2 means closed (0), 3 means open (1); any other
            // raw value is dropped from the event, as the controllers send
            // transitional codes clients do not understand.
            let remapped = match content.remove("Status").and_then(|v| v.as_i64()) {
                Some(2) => Some(0),
                Some(3) => Some(1),
                _ => None,
            };
            if let Some(status) = remapped {
                content.insert("Status".to_string(), Value::from(status));
            }
        }
        SideEffect::None | SideEffect::OffDuty | SideEffect::Passage => {}
    }
}

struct Cursor<'a> {
    body: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    const fn new(body: &'a [u8]) -> Self {
        Self { body, offset: 0 }
    }

    fn take(&mut self, width: usize, field: &'static str) -> Result<&'a [u8]> {
        let remaining = self.body.len() - self.offset;
        if width > remaining {
            return Err(ProtoError::Truncated {
                field,
                width,
                remaining,
            });
        }
        let slice = &self.body[self.offset..self.offset + width];
        self.offset += width;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{alert, data};
    use serde_json::json;

    const LANE: &str = "1F010000000004011010101010";

    fn frame(catalog: u8, msg_type: u8, tail: &str) -> RawFrame {
        let body = format!("{catalog:02X}{msg_type:02X}20240101120000{LANE}{tail}");
        RawFrame::from_body(body.as_bytes())
    }

    fn decoded_event(frame: &RawFrame) -> Event {
        match decode(frame).unwrap() {
            Decoded::Event { event, .. } => event,
            Decoded::Heartbeat { .. } => panic!("expected event"),
        }
    }

    #[test]
    fn test_entry_lane_decodes_all_fields() {
        // Shift=01, EmpID=04D2 (1234), EnClass=02, EnType=03, ETCCar=1.
        let event = decoded_event(&frame(0x01, data::ENTRY_LANE, "0104D202031"));
        assert_eq!(event.timestamp, "2024-01-01 12:00:00");
        assert_eq!(event.lane_id, LANE);
        assert_eq!(event.station_id(), "1F01000000000401");
        assert_eq!(event.content["Shift"], json!(1));
        assert_eq!(event.content["EmpID"], json!(1234));
        assert_eq!(event.content["EnClass"], json!(2));
        assert_eq!(event.content["EnType"], json!(3));
        assert_eq!(event.content["ETCCar"], json!(1));
    }

    #[test]
    fn test_content_preserves_schema_order() {
        let event = decoded_event(&frame(0x01, data::ENTRY_LANE, "0104D202031"));
        let keys: Vec<&str> = event.content.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Shift", "EmpID", "EnClass", "EnType", "ETCCar"]);
    }

    #[test]
    fn test_on_duty_adds_duty_time_and_decodes_gbk_name() {
        let event = decoded_event(&frame(
            0x01,
            data::ON_DUTY,
            "0104D2D5C5C8FD202020202020",
        ));
        assert_eq!(event.content["EmpName"], json!("张三"));
        assert_eq!(event.content["onDutyTime"], json!("2024-01-01 12:00:00"));
    }

    #[test]
    fn test_lane_status_remaps_wire_codes() {
        let closed = decoded_event(&frame(0x01, data::LANE_STATUS, "0104D202"));
        assert_eq!(closed.content["Status"], json!(0));
        let open = decoded_event(&frame(0x01, data::LANE_STATUS, "0104D203"));
        assert_eq!(open.content["Status"], json!(1));
        let other = decoded_event(&frame(0x01, data::LANE_STATUS, "0104D209"));
        assert!(!other.content.contains_key("Status"));
    }

    #[test]
    fn test_alert_card_thresholds() {
        let event = decoded_event(&frame(
            0x20,
            alert::ENTRY_CARD_LOW,
            "0104D20000006400000032",
        ));
        assert!(event.is_alert());
        assert_eq!(event.content["Threshold"], json!(100));
        assert_eq!(event.content["Current"], json!(50));
    }

    #[test]
    fn test_heartbeat_is_not_an_event() {
        let decoded = decode(&frame(0x30, 0x22, "")).unwrap();
        assert_eq!(
            decoded,
            Decoded::Heartbeat {
                lane_id: LANE.to_string(),
                timestamp: "2024-01-01 12:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type_is_a_skippable_error() {
        let err = decode(&frame(0x20, 0x7E, "")).unwrap_err();
        assert!(err.is_unknown_message());
    }

    #[test]
    fn test_unknown_category_is_a_skippable_error() {
        let err = decode(&frame(0x0F, 0x01, "")).unwrap_err();
        assert!(err.is_unknown_message());
    }

    #[test]
    fn test_truncated_field_fails_frame() {
        // Violation wants Shift(2)+EmpID(4); give it three characters.
        let err = decode(&frame(0x20, alert::VIOLATION, "010")).unwrap_err();
        assert!(matches!(err, ProtoError::Truncated { field: "EmpID", .. }));
    }

    #[test]
    fn test_bad_timestamp_fails_frame() {
        let body = format!("3022202401011200{LANE}");
        let err = decode(&RawFrame::from_body(body.as_bytes())).unwrap_err();
        // Header consumed 14 chars of a short body; either error shape means
        // the frame is dropped without producing an event.
        assert!(!err.is_unknown_message());
    }

    #[test]
    fn test_short_frame_rejected() {
        let err = decode(&RawFrame::from_body(b"3022")).unwrap_err();
        assert!(matches!(err, ProtoError::ShortFrame { .. }));
    }
}
