//! Concurrency-safe shared lane state.
//!
//! Two arena-style stores back the pipeline: [`LaneStateStore`] holds the
//! mutable per-lane projections (duty status, connection flag, last alert
//! fields, core metrics) read by reporting collaborators, and
//! [`LivenessTable`] holds the per-lane last-seen timestamps written by
//! heartbeat frames and scanned by the liveness monitor.
//!
//! Each store owns its lock internally and exposes only atomic
//! get/update/scan operations; callers never take a lock themselves. All
//! mutation is field-level last-write-wins with no versioning, and there is
//! no deletion path: entries live for the process lifetime once topology is
//! loaded.

mod liveness;
mod store;

pub use liveness::LivenessTable;
pub use store::{CoreData, LaneInfo, LaneStateStore};
