//! Toll-lane telemetry gateway daemon.
//!
//! Wires the ingestion crates together: topology load, TCP monitor server,
//! liveness monitor, client heartbeat service, and the HTTP/WebSocket
//! surface that registers push clients and accepts metric batches.

pub mod config;
pub mod error;
pub mod http;

pub use config::GatewayConfig;
pub use error::GatewayError;
