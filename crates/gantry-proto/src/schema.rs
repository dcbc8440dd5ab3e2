//! Per-(category, type) field schemas.
//!
//! Decoder correctness lives in this table, not in per-type control flow:
//! each message type declares an ordered list of fixed-width fields plus a
//! side-effect descriptor for the few types that also mutate shared lane
//! state. Every frame body starts with the common 14-character timestamp
//! and 26-character lane identifier, which are not repeated per type.
//!
//! Invariant: the total declared width for a type must not exceed the frame
//! body length. The protocol has no length prefix, only implicit fixed
//! widths, so a misaligned schema corrupts every subsequent field in the
//! same frame. That fragility is inherent to the protocol.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::message::{alert, data, Category};

/// Width of the common timestamp header field.
pub const TIMESTAMP_WIDTH: usize = 14;

/// Width of the common lane-identifier header field.
pub const LANE_ID_WIDTH: usize = 26;

/// How a fixed-width substring decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// ASCII-hex characters → big-endian signed 32-bit integer.
    HexInt,
    /// 14 ASCII digits `YYYYMMDDHHMMSS`, reformatted with separators.
    Timestamp,
    /// ASCII substring taken verbatim.
    Text,
    /// ASCII-hex characters → bytes → GBK text, trailing spaces trimmed.
    GbkText,
}

/// One field in a message schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name as delivered to clients.
    pub name: &'static str,
    /// Declared character width on the wire.
    pub width: usize,
    /// Decode kind.
    pub kind: FieldKind,
}

const fn f(name: &'static str, width: usize, kind: FieldKind) -> FieldDef {
    FieldDef { name, width, kind }
}

/// Shared-state mutation a message type performs besides producing an event.
///
/// These are the only writes into lane projections from the decode path;
/// the pipeline interprets them against the lane state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Event only.
    None,
    /// Mark the lane on duty; record shift, operator id/name, on-duty time.
    OnDuty,
    /// Mark the lane off duty; record shift, operator id/name, off-duty time.
    OffDuty,
    /// Record the remapped lane open/closed status.
    LaneStatus,
    /// Record the shift number and operator id from a passage record.
    Passage,
}

/// Schema for one (category, type) pair.
#[derive(Debug)]
pub struct MessageSchema {
    /// Stable human-readable message name used in logs.
    pub name: &'static str,
    /// Ordered type-specific fields following the common header.
    pub fields: &'static [FieldDef],
    /// Shared-state mutation descriptor.
    pub side_effect: SideEffect,
}

const SHIFT: FieldDef = f("Shift", 2, FieldKind::HexInt);
const EMP_ID: FieldDef = f("EmpID", 4, FieldKind::HexInt);

macro_rules! schema {
    ($name:literal, $effect:expr, [$($field:expr),* $(,)?]) => {
        MessageSchema {
            name: $name,
            fields: &[$($field),*],
            side_effect: $effect,
        }
    };
}

#[rustfmt::skip]
static SCHEMAS: &[(Category, u8, MessageSchema)] = &[
    // Data catalog.
    (Category::Data, data::ENTRY_LANE, schema!("entry-lane", SideEffect::Passage, [
        SHIFT, EMP_ID,
        f("EnClass", 2, FieldKind::HexInt),
        f("EnType", 2, FieldKind::HexInt),
        f("ETCCar", 1, FieldKind::HexInt),
    ])),
    (Category::Data, data::EXIT_LANE, schema!("exit-lane", SideEffect::Passage, [
        SHIFT, EMP_ID,
        f("ExClass", 2, FieldKind::HexInt),
        f("ExType", 2, FieldKind::HexInt),
        f("Pass", 4, FieldKind::HexInt),
        f("Loan", 4, FieldKind::HexInt),
        f("Forfeit", 4, FieldKind::HexInt),
        f("ETCCar", 1, FieldKind::HexInt),
    ])),
    (Category::Data, data::ON_DUTY, schema!("on-duty", SideEffect::OnDuty, [
        SHIFT, EMP_ID,
        f("EmpName", 20, FieldKind::GbkText),
    ])),
    (Category::Data, data::ENTRY_OFF_DUTY, schema!("entry-off-duty", SideEffect::OffDuty, [
        SHIFT, EMP_ID,
        f("EmpName", 20, FieldKind::GbkText),
        f("OffDutyTime", 14, FieldKind::Timestamp),
    ])),
    (Category::Data, data::EXIT_OFF_DUTY, schema!("exit-off-duty", SideEffect::OffDuty, [
        SHIFT, EMP_ID,
        f("EmpName", 20, FieldKind::GbkText),
        f("OffDutyTime", 14, FieldKind::Timestamp),
    ])),
    (Category::Data, data::IMAGE, schema!("image", SideEffect::None, [])),
    (Category::Data, data::VOICE, schema!("voice", SideEffect::None, [])),
    (Category::Data, data::LANE_STATUS, schema!("lane-status", SideEffect::LaneStatus, [
        SHIFT, EMP_ID,
        f("Status", 2, FieldKind::HexInt),
    ])),
    (Category::Data, data::VOUCHER, schema!("voucher", SideEffect::None, [])),
    (Category::Data, data::ENTRY_QUERY, schema!("entry-query", SideEffect::None, [])),

    // Alert catalog.
    (Category::Alert, alert::CLASS_MISMATCH, schema!("class-mismatch", SideEffect::None, [
        SHIFT, EMP_ID,
        f("EnClass", 2, FieldKind::HexInt),
        f("ExPreClass", 2, FieldKind::HexInt),
        f("ExClass", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::VIOLATION, schema!("violation", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::DUTY_END, schema!("duty-end", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Offset", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::TYPE_MISMATCH, schema!("type-mismatch", SideEffect::None, [
        SHIFT, EMP_ID,
        f("EnType", 2, FieldKind::HexInt),
        f("ExType", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::ENTRY_CARD_LOW, schema!("entry-card-low", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Threshold", 8, FieldKind::HexInt),
        f("Current", 8, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::EXIT_CARD_HIGH, schema!("exit-card-high", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Threshold", 8, FieldKind::HexInt),
        f("Current", 8, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::NOTE_PRINT_LOW, schema!("note-print-low", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Threshold", 8, FieldKind::HexInt),
        f("Current", 8, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::NOTE_HAND_LOW, schema!("note-hand-low", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Threshold", 8, FieldKind::HexInt),
        f("Current", 8, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::VEHICLE_COUNT, schema!("vehicle-count", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::CARD_OP_FAIL, schema!("card-op-fail", SideEffect::None, [
        SHIFT, EMP_ID,
        f("CardType", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::READER_INIT_FAIL, schema!("reader-init-fail", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::CARD_MODE_CHANGE, schema!("card-mode-change", SideEffect::None, [
        SHIFT, EMP_ID,
        f("OrigMode", 2, FieldKind::HexInt),
        f("CurrMode", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::NOTE_MODE_CHANGE, schema!("note-mode-change", SideEffect::None, [
        SHIFT, EMP_ID,
        f("OrigMode", 2, FieldKind::HexInt),
        f("CurrMode", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::NOTE_REPRINT, schema!("note-reprint", SideEffect::None, [
        SHIFT, EMP_ID,
        f("PrintTimes", 2, FieldKind::HexInt),
        f("PrintNoteNo", 30, FieldKind::Text),
    ])),
    (Category::Alert, alert::EXIT_BAD_CARD, schema!("exit-bad-card", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Class", 2, FieldKind::HexInt),
        f("Type", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::EXIT_NO_CARD, schema!("exit-no-card", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Class", 2, FieldKind::HexInt),
        f("Type", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::SIMULATED_PASS, schema!("simulated-pass", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::DEBT, schema!("debt", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Class", 2, FieldKind::HexInt),
        f("Type", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::FREE_VEHICLE, schema!("free-vehicle", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Type", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::FLOW_AMEND, schema!("flow-amend", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::CONVOY_START, schema!("convoy-start", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::CONVOY_END, schema!("convoy-end", SideEffect::None, [
        SHIFT, EMP_ID,
        f("Flow", 4, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::EXIT_CLASS_AMEND, schema!("exit-class-amend", SideEffect::None, [
        SHIFT, EMP_ID,
        f("ExPreClass", 2, FieldKind::HexInt),
        f("ExClass", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::READER_FAULT, schema!("reader-fault", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::U_TURN, schema!("u-turn", SideEffect::None, [
        SHIFT, EMP_ID,
        f("ExClass", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::OVERTIME, schema!("overtime-vehicle", SideEffect::None, [
        SHIFT, EMP_ID,
        f("ExClass", 2, FieldKind::HexInt),
    ])),
    (Category::Alert, alert::MANUAL_ALERT, schema!("manual-alert", SideEffect::None, [SHIFT, EMP_ID])),
    (Category::Alert, alert::ETC_INFO, schema!("etc-info", SideEffect::None, [
        f("ETCErrorNote", 30, FieldKind::Text),
    ])),
];

static LOOKUP: Lazy<HashMap<(Category, u8), &'static MessageSchema>> = Lazy::new(|| {
    SCHEMAS
        .iter()
        .map(|(category, msg_type, schema)| ((*category, *msg_type), schema))
        .collect()
});

/// Look up the schema for a (category, type) pair.
#[must_use]
pub fn schema_for(category: Category, msg_type: u8) -> Option<&'static MessageSchema> {
    LOOKUP.get(&(category, msg_type)).copied()
}

/// Iterate over every registered schema. Exposed for table-level checks.
pub fn all_schemas() -> impl Iterator<Item = (Category, u8, &'static MessageSchema)> {
    SCHEMAS
        .iter()
        .map(|(category, msg_type, schema)| (*category, *msg_type, schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_covers_every_entry() {
        for (category, msg_type, schema) in all_schemas() {
            let found = schema_for(category, msg_type).unwrap();
            assert_eq!(found.name, schema.name);
        }
    }

    #[test]
    fn test_no_duplicate_type_registrations() {
        assert_eq!(LOOKUP.len(), SCHEMAS.len());
    }

    #[test]
    fn test_heartbeat_category_has_no_schema() {
        // Heartbeats carry only the common header and are handled before
        // schema dispatch.
        assert!(schema_for(Category::Heartbeat, crate::HEARTBEAT_TYPE).is_none());
    }

    #[test]
    fn test_side_effect_types_are_the_expected_six() {
        let with_effects: Vec<&str> = all_schemas()
            .filter(|(_, _, s)| s.side_effect != SideEffect::None)
            .map(|(_, _, s)| s.name)
            .collect();
        assert_eq!(
            with_effects,
            [
                "entry-lane",
                "exit-lane",
                "on-duty",
                "entry-off-duty",
                "exit-off-duty",
                "lane-status"
            ]
        );
    }
}
