//! Directed, attribute-free relationships

use super::types::{EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge. Relationships in this graph carry no properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    /// Edge goes FROM this node
    pub source: NodeId,
    /// Edge goes TO this node
    pub target: NodeId,
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
        }
    }

    /// Check whether this edge links `source` to `target` with `edge_type`
    pub fn links(&self, source: NodeId, target: NodeId, edge_type: &EdgeType) -> bool {
        self.source == source && self.target == target && &self.edge_type == edge_type
    }
}
