//! Topology resolution seam and the file-backed static implementation.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::node::{build_tree, Node, NodeKind, Station};

/// Errors raised while loading topology data.
///
/// Topology failures are fatal at startup: the core cannot run without
/// lane/station identity resolution.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Topology file could not be read.
    #[error("failed to read topology file '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Topology file was not valid node JSON.
    #[error("invalid topology data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Topology contained no lane nodes.
    #[error("topology contains no lanes")]
    NoLanes,
}

/// Resolves device addresses and identifiers against the loaded topology.
///
/// Production topology comes from an external relational collaborator; this
/// trait is the interface the core consumes.
pub trait TopologyResolver: Send + Sync {
    /// Resolve a source IP to its node, if the address is known.
    fn node_by_ip(&self, ip: &str) -> Option<Node>;

    /// All lane nodes, used to seed the lane state store.
    fn lanes(&self) -> Vec<Node>;

    /// The station → plaza → lane tree for reporting reads.
    fn station_tree(&self) -> Vec<Station>;
}

/// In-memory topology loaded once from a JSON node list.
#[derive(Debug)]
pub struct StaticTopology {
    ip_to_node: HashMap<String, Node>,
    lanes: Vec<Node>,
    tree: Vec<Station>,
}

impl StaticTopology {
    /// Build a topology from a flat node list.
    pub fn new(nodes: Vec<Node>) -> Result<Self, TopologyError> {
        let lanes: Vec<Node> = nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::Lane)
            .cloned()
            .collect();
        if lanes.is_empty() {
            return Err(TopologyError::NoLanes);
        }
        let ip_to_node = nodes
            .iter()
            .map(|n| (n.ip.clone(), n.clone()))
            .collect();
        let tree = build_tree(&nodes);
        info!(
            nodes = nodes.len(),
            lanes = lanes.len(),
            stations = tree.len(),
            "topology loaded"
        );
        Ok(Self {
            ip_to_node,
            lanes,
            tree,
        })
    }

    /// Load a topology from a JSON file containing an array of nodes.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| TopologyError::Io {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        let nodes: Vec<Node> = serde_json::from_str(&content)?;
        Self::new(nodes)
    }
}

impl TopologyResolver for StaticTopology {
    fn node_by_ip(&self, ip: &str) -> Option<Node> {
        self.ip_to_node.get(ip).cloned()
    }

    fn lanes(&self) -> Vec<Node> {
        self.lanes.clone()
    }

    fn station_tree(&self) -> Vec<Station> {
        self.tree.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(id: &str, ip: &str) -> Node {
        Node {
            id: id.to_string(),
            name: "lane".to_string(),
            ip: ip.to_string(),
            node_type: 0,
            tran_mode: 0,
        }
    }

    #[test]
    fn test_resolves_known_ip() {
        let topology =
            StaticTopology::new(vec![lane("1F0100000000040101000001E7", "10.1.2.3")]).unwrap();
        let node = topology.node_by_ip("10.1.2.3").unwrap();
        assert_eq!(node.id, "1F0100000000040101000001E7");
        assert!(topology.node_by_ip("10.9.9.9").is_none());
    }

    #[test]
    fn test_rejects_laneless_topology() {
        assert!(matches!(
            StaticTopology::new(Vec::new()),
            Err(TopologyError::NoLanes)
        ));
    }

    #[test]
    fn test_parses_node_json() {
        let json = r#"[{
            "nodeID": "1F0100000000040101000001E7",
            "nodeName": "Lane 1",
            "nodeIP": "10.1.2.3",
            "nodeType": 0,
            "tranMode": 1
        }]"#;
        let nodes: Vec<Node> = serde_json::from_str(json).unwrap();
        let topology = StaticTopology::new(nodes).unwrap();
        assert_eq!(topology.lanes().len(), 1);
    }
}
