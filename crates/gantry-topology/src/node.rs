//! Node types and the station/plaza/lane tree.

use serde::{Deserialize, Serialize};

/// Kind of a logical node, encoded in the trailing digit of its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Toll station (trailing digit `5`).
    Station,
    /// Toll plaza within a station (trailing digit `6`).
    Plaza,
    /// Individual lane within a plaza (trailing digit `7`).
    Lane,
    /// Anything else; kept for forward compatibility with topology data.
    Other,
}

/// Identity of a logical device in the toll network.
///
/// Immutable after topology load; the external topology collaborator owns
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Fixed-width hierarchical identifier.
    #[serde(rename = "nodeID")]
    pub id: String,
    /// Human-readable name.
    #[serde(rename = "nodeName")]
    pub name: String,
    /// Source IP address of the device.
    #[serde(rename = "nodeIP")]
    pub ip: String,
    /// Raw node type code from topology data.
    #[serde(rename = "nodeType")]
    pub node_type: i32,
    /// Transaction mode code.
    #[serde(rename = "tranMode")]
    pub tran_mode: i32,
}

impl Node {
    /// The node kind derived from the identifier's trailing digit.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.id.as_bytes().last() {
            Some(b'5') => NodeKind::Station,
            Some(b'6') => NodeKind::Plaza,
            Some(b'7') => NodeKind::Lane,
            _ => NodeKind::Other,
        }
    }

    /// Station segment (characters 12..16) used for grouping, when present.
    #[must_use]
    pub fn station_segment(&self) -> Option<&str> {
        self.id.get(12..16)
    }

    /// Plaza segment (characters 12..20) used for grouping, when present.
    #[must_use]
    pub fn plaza_segment(&self) -> Option<&str> {
        self.id.get(12..20)
    }
}

/// A plaza with its member lanes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plaza {
    /// The plaza node.
    pub plaza: Node,
    /// Lanes grouped under this plaza.
    pub lanes: Vec<Node>,
}

/// A station with its member plazas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// The station node.
    pub station: Node,
    /// Plazas grouped under this station.
    pub plazas: Vec<Plaza>,
}

/// Build the station → plaza → lane tree from a flat node list.
///
/// Grouping follows the hierarchical id segments: a plaza belongs to the
/// station sharing its characters 12..16, a lane to the plaza sharing its
/// characters 12..20. Nodes with malformed (short) ids are left out.
#[must_use]
pub fn build_tree(nodes: &[Node]) -> Vec<Station> {
    let stations: Vec<&Node> = nodes.iter().filter(|n| n.kind() == NodeKind::Station).collect();
    let plazas: Vec<&Node> = nodes.iter().filter(|n| n.kind() == NodeKind::Plaza).collect();
    let lanes: Vec<&Node> = nodes.iter().filter(|n| n.kind() == NodeKind::Lane).collect();

    stations
        .into_iter()
        .map(|station| {
            let member_plazas = plazas
                .iter()
                .filter(|plaza| {
                    plaza.station_segment().is_some()
                        && plaza.station_segment() == station.station_segment()
                })
                .map(|plaza| Plaza {
                    plaza: (*plaza).clone(),
                    lanes: lanes
                        .iter()
                        .filter(|lane| {
                            lane.plaza_segment().is_some()
                                && lane.plaza_segment() == plaza.plaza_segment()
                        })
                        .map(|lane| (*lane).clone())
                        .collect(),
                })
                .collect();
            Station {
                station: station.clone(),
                plazas: member_plazas,
            }
        })
        .collect()
}
