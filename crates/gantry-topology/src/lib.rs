//! Toll-network node identity and topology resolution.
//!
//! A [`Node`] is the identity of a logical device: a station, plaza, or
//! lane. Node identifiers are hierarchical fixed-width codes; the first 16
//! characters of a lane id name its station, characters 12..20 its plaza,
//! and the trailing digit encodes the node kind. Nodes are immutable after
//! topology load.
//!
//! Topology ownership sits outside this system (a relational database in
//! production); [`TopologyResolver`] is the seam the core calls through and
//! [`StaticTopology`] is a file-backed implementation used for wiring and
//! tests.

mod node;
mod resolver;

pub use node::{Node, NodeKind, Plaza, Station};
pub use resolver::{StaticTopology, TopologyError, TopologyResolver};

/// Character length of a station identifier prefix.
pub const STATION_PREFIX_LEN: usize = 16;

/// The station prefix of any hierarchical node identifier.
///
/// Identifiers shorter than the prefix are returned whole; the protocol
/// guarantees 26 characters for lane ids, so that only happens on
/// hand-built inputs.
#[must_use]
pub fn station_prefix(node_id: &str) -> &str {
    if node_id.len() >= STATION_PREFIX_LEN {
        &node_id[..STATION_PREFIX_LEN]
    } else {
        node_id
    }
}
