//! Errors raised by the ingestion surfaces.

use thiserror::Error;

/// Failures starting or running an ingestion listener.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The TCP monitor listener could not bind its address.
    #[error("failed to bind monitor listener on {addr}: {source}")]
    Bind {
        /// Requested listen address.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
