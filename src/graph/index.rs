//! Exact-match property indexes
//!
//! One index per `(label, property)`, mapping a string value to the nodes
//! that carry it. Only string values are indexed; lookups on anything else
//! report "no index" and callers fall back to a label scan.

use super::node::Node;
use super::property::PropertyValue;
use super::types::{Label, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Key for identifying a property index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyIndexKey {
    pub label: Label,
    pub property: String,
}

impl PropertyIndexKey {
    fn new(label: &Label, property: &str) -> Self {
        Self {
            label: label.clone(),
            property: property.to_string(),
        }
    }
}

/// Value -> nodes for one `(label, property)`
#[derive(Debug, Default)]
pub struct PropertyIndex {
    index: FxHashMap<String, FxHashSet<NodeId>>,
}

impl PropertyIndex {
    pub fn insert(&mut self, value: &str, node_id: NodeId) {
        self.index.entry(value.to_string()).or_default().insert(node_id);
    }

    pub fn remove(&mut self, value: &str, node_id: NodeId) {
        if let Some(nodes) = self.index.get_mut(value) {
            nodes.remove(&node_id);
            if nodes.is_empty() {
                self.index.remove(value);
            }
        }
    }

    pub fn get(&self, value: &str) -> Vec<NodeId> {
        self.index
            .get(value)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// All property indexes of one graph
#[derive(Debug, Default)]
pub struct IndexManager {
    indices: FxHashMap<PropertyIndexKey, PropertyIndex>,
}

impl IndexManager {
    /// Register an empty index. Returns false if it already existed.
    pub fn create_index(&mut self, label: &Label, property: &str) -> bool {
        let key = PropertyIndexKey::new(label, property);
        if self.indices.contains_key(&key) {
            return false;
        }
        self.indices.insert(key, PropertyIndex::default());
        true
    }

    pub fn has_index(&self, label: &Label, property: &str) -> bool {
        self.indices.contains_key(&PropertyIndexKey::new(label, property))
    }

    /// Update the index when a node property is set
    pub fn index_insert(&mut self, label: &Label, property: &str, value: &PropertyValue, node_id: NodeId) {
        if let (Some(index), Some(value)) = (
            self.indices.get_mut(&PropertyIndexKey::new(label, property)),
            value.as_string(),
        ) {
            index.insert(value, node_id);
        }
    }

    /// Update the index when a node property is removed or replaced
    pub fn index_remove(&mut self, label: &Label, property: &str, value: &PropertyValue, node_id: NodeId) {
        if let (Some(index), Some(value)) = (
            self.indices.get_mut(&PropertyIndexKey::new(label, property)),
            value.as_string(),
        ) {
            index.remove(value, node_id);
        }
    }

    pub fn index_node(&mut self, node: &Node) {
        for (key, value) in &node.properties {
            self.index_insert(&node.label, key, value, node.id);
        }
    }

    pub fn unindex_node(&mut self, node: &Node) {
        for (key, value) in &node.properties {
            self.index_remove(&node.label, key, value, node.id);
        }
    }

    /// Candidate nodes for `property = value`, or `None` when no index
    /// can answer.
    pub fn lookup(&self, label: &Label, property: &str, value: &PropertyValue) -> Option<Vec<NodeId>> {
        let index = self.indices.get(&PropertyIndexKey::new(label, property))?;
        Some(index.get(value.as_string()?))
    }
}
