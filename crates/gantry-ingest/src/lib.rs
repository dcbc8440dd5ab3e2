//! Lane telemetry ingestion.
//!
//! Three inbound paths feed the shared state and the push broadcaster:
//! the TCP [`server::MonitorServer`] receiving framed lane telemetry, the
//! [`metrics::MetricIngestor`] receiving HTTP metric pushes, and the
//! [`monitor::LivenessMonitor`] synthesizing connect/disconnect events from
//! heartbeat staleness. All three converge on the [`pipeline::EventPipeline`]
//! collaborators: the lane state store and the client registry.

pub mod error;
pub mod metrics;
pub mod monitor;
pub mod pipeline;
pub mod server;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::IngestError;
pub use metrics::{MetricIngestor, MetricValue};
pub use monitor::LivenessMonitor;
pub use pipeline::EventPipeline;
pub use server::MonitorServer;
