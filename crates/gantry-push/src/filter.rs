//! Per-client alert strategy filters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One alert-type entry of a client's strategy.
///
/// `type_code` is the alert message type the entry applies to, `is_checked`
/// turns delivery of that type on, and `level` is the severity tag attached
/// to delivered alerts of that type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyItem {
    #[serde(rename = "type")]
    pub type_code: u8,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isChecked")]
    pub is_checked: bool,
    #[serde(default)]
    pub level: u8,
}

/// A client's full alert strategy, keyed by alert message type.
///
/// Alert types with no entry are suppressed; data and heartbeat events are
/// never filtered.
#[derive(Debug, Clone, Default)]
pub struct StrategyFilter {
    items: HashMap<u8, StrategyItem>,
}

impl StrategyFilter {
    #[must_use]
    pub fn from_items(items: Vec<StrategyItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.type_code, item))
                .collect(),
        }
    }

    /// Whether alerts of the given type should be delivered.
    #[must_use]
    pub fn enabled(&self, type_code: u8) -> bool {
        self.items
            .get(&type_code)
            .is_some_and(|item| item.is_checked)
    }

    /// Severity level for the given alert type, zero when unconfigured.
    #[must_use]
    pub fn level(&self, type_code: u8) -> u8 {
        self.items.get(&type_code).map_or(0, |item| item.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn filter() -> StrategyFilter {
        StrategyFilter::from_items(vec![
            StrategyItem {
                type_code: 0x01,
                description: "class mismatch".to_string(),
                is_checked: true,
                level: 2,
            },
            StrategyItem {
                type_code: 0x05,
                description: "barrier fault".to_string(),
                is_checked: false,
                level: 3,
            },
        ])
    }

    #[test_case(0x01, true; "checked entry delivers")]
    #[test_case(0x05, false; "unchecked entry suppresses")]
    #[test_case(0x0a, false; "absent entry suppresses")]
    fn test_enabled(type_code: u8, want: bool) {
        assert_eq!(filter().enabled(type_code), want);
    }

    #[test]
    fn test_level_defaults_to_zero() {
        let f = filter();
        assert_eq!(f.level(0x01), 2);
        assert_eq!(f.level(0x0a), 0);
    }

    #[test]
    fn test_item_wire_names() {
        let item: StrategyItem =
            serde_json::from_str(r#"{"type": 1, "isChecked": true, "level": 2}"#).unwrap();
        assert_eq!(item.type_code, 0x01);
        assert!(item.is_checked);
        assert_eq!(item.level, 2);
        assert!(item.description.is_empty());
    }
}
