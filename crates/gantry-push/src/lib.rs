//! Push-client registry and filtered event broadcaster.
//!
//! Consumers (dashboards, roadside displays) register a [`client::Client`]
//! with a station subscription set and an alert [`filter::StrategyFilter`].
//! The [`registry::ClientRegistry`] fans decoded lane events out to every
//! live subscriber, wrapping each one in the standard response
//! [`envelope::Envelope`]. The [`heartbeat::HeartbeatService`] probes every
//! client on a fixed cadence and retires the ones that stop answering.

pub mod client;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod heartbeat;
pub mod registry;
pub mod transport;

pub use client::Client;
pub use envelope::Envelope;
pub use error::PushError;
pub use filter::{StrategyFilter, StrategyItem};
pub use heartbeat::HeartbeatService;
pub use registry::ClientRegistry;
pub use transport::PushTransport;
