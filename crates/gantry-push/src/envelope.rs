//! Standard response envelope shared by pushed events and HTTP replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wrapper placed around every payload sent to a push client.
///
/// Pushed events always carry `code = 0`, an empty error message, and
/// `status = true`; the same shape is reused by the HTTP surface where the
/// error fields do vary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    pub data: Value,
    pub status: bool,
}

impl Envelope {
    /// Wraps a successful payload.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            code: 0,
            err_msg: String::new(),
            data,
            status: true,
        }
    }

    /// Wraps an error reply for the HTTP surface.
    #[must_use]
    pub fn err(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            err_msg: message.into(),
            data: Value::Null,
            status: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let env = Envelope::ok(json!({"MsgLane": "x"}));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["code"], 0);
        assert_eq!(value["errMsg"], "");
        assert_eq!(value["status"], true);
        assert_eq!(value["data"]["MsgLane"], "x");
    }

    #[test]
    fn test_err_envelope_shape() {
        let env = Envelope::err(500, "topology unavailable");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["code"], 500);
        assert_eq!(value["errMsg"], "topology unavailable");
        assert_eq!(value["status"], false);
        assert!(value["data"].is_null());
    }
}
