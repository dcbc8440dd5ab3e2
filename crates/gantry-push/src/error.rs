//! Errors raised while writing to push clients.

use thiserror::Error;

/// Failures surfaced by a [`crate::transport::PushTransport`].
#[derive(Debug, Error)]
pub enum PushError {
    /// The underlying connection refused the write.
    #[error("transport write failed: {0}")]
    Transport(String),

    /// The transport was closed before or during the write.
    #[error("transport already closed")]
    Closed,

    /// The payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
