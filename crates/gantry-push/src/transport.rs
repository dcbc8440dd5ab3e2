//! Transport abstraction between the broadcaster and concrete connections.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PushError;

/// Write side of a push connection.
///
/// The registry serializes access to each transport through the owning
/// client's write lock, so implementations only need `&mut self`.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Sends one JSON payload to the client.
    async fn send(&mut self, payload: &Value) -> Result<(), PushError>;

    /// Closes the underlying connection. Subsequent sends must fail.
    async fn close(&mut self);
}
