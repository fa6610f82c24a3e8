//! In-memory graph storage
//!
//! Arena-backed storage with adjacency lists, label / edge-type indexes and
//! exact-match property indexes. Besides plain create/delete it provides
//! the primitives the movie statements are built from:
//! - `merge_node` / `merge_edge`: match-or-create keyed on properties
//!   (nodes) or on `(source, target, type)` (edges)
//! - `delete_node`: detach-delete, edges first, no dangling edges left
//! - `begin` / `commit` / `rollback`: an undo journal so a batch of
//!   mutations can be reverted as a unit

use super::edge::Edge;
use super::index::IndexManager;
use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, Label, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Inverse of one mutation, replayed newest-first on rollback
#[derive(Debug)]
enum Undo {
    CreateNode(NodeId),
    CreateEdge(EdgeId),
    DeleteNode(Node),
    DeleteEdge(Edge),
    SetProperty {
        node: NodeId,
        key: String,
        old: Option<PropertyValue>,
    },
}

/// In-memory graph storage
///
/// - nodes: NodeId -> Node (slot is `None` once deleted)
/// - edges: EdgeId -> Edge
/// - outgoing / incoming: NodeId -> Vec<EdgeId>
/// - label_index: Label -> {NodeId}
/// - edge_type_index: EdgeType -> {EdgeId}
/// - property_index: (Label, property) -> value -> {NodeId}
#[derive(Debug)]
pub struct GraphStore {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    free_node_ids: Vec<u64>,
    free_edge_ids: Vec<u64>,
    label_index: FxHashMap<Label, FxHashSet<NodeId>>,
    edge_type_index: FxHashMap<EdgeType, FxHashSet<EdgeId>>,
    property_index: IndexManager,
    /// Present while a transaction is open
    journal: Option<Vec<Undo>>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(256),
            edges: Vec::with_capacity(512),
            outgoing: Vec::with_capacity(256),
            incoming: Vec::with_capacity(256),
            free_node_ids: Vec::new(),
            free_edge_ids: Vec::new(),
            label_index: FxHashMap::default(),
            edge_type_index: FxHashMap::default(),
            property_index: IndexManager::default(),
            journal: None,
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    /// Index `property` on nodes labelled `label`, including nodes that
    /// already exist.
    pub fn create_index(&mut self, label: impl Into<Label>, property: &str) {
        let label = label.into();
        if !self.property_index.create_index(&label, property) {
            return;
        }
        let existing: Vec<(NodeId, PropertyValue)> = self
            .get_nodes_by_label(&label)
            .into_iter()
            .filter_map(|node| node.get_property(property).map(|v| (node.id, v.clone())))
            .collect();
        for (id, value) in existing {
            self.property_index.index_insert(&label, property, &value, id);
        }
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    /// Start recording mutations. Nested calls keep the outer transaction.
    pub fn begin(&mut self) {
        if self.journal.is_none() {
            self.journal = Some(Vec::new());
        }
    }

    /// Keep everything done since `begin`
    pub fn commit(&mut self) {
        self.journal = None;
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    /// Revert everything done since `begin`. Ids freed or taken inside the
    /// transaction may be handed out in a different order afterwards.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for undo in journal.into_iter().rev() {
            match undo {
                // Every later mutation is already undone, so nothing else
                // references these.
                Undo::CreateEdge(id) => {
                    let _ = self.delete_edge(id);
                }
                Undo::CreateNode(id) => {
                    let _ = self.delete_node(id);
                }
                Undo::DeleteNode(node) => self.restore_node(node),
                Undo::DeleteEdge(edge) => self.restore_edge(edge),
                Undo::SetProperty { node, key, old } => self.restore_property(node, key, old),
            }
        }
    }

    fn ensure_node_slot(&mut self, idx: usize) {
        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
            self.incoming.resize(idx + 1, Vec::new());
        }
    }

    /// Create a node with a label and properties
    pub fn create_node(&mut self, label: impl Into<Label>, properties: PropertyMap) -> NodeId {
        let raw = self.free_node_ids.pop().unwrap_or_else(|| {
            let id = self.next_node_id;
            self.next_node_id += 1;
            id
        });
        let node_id = NodeId::new(raw);
        let idx = raw as usize;

        let node = Node::new(node_id, label, properties);
        self.label_index
            .entry(node.label.clone())
            .or_default()
            .insert(node_id);
        self.property_index.index_node(&node);

        self.ensure_node_slot(idx);
        self.nodes[idx] = Some(node);
        self.record(Undo::CreateNode(node_id));
        node_id
    }

    fn restore_node(&mut self, node: Node) {
        let raw = node.id.as_u64();
        self.free_node_ids.retain(|&id| id != raw);
        self.label_index
            .entry(node.label.clone())
            .or_default()
            .insert(node.id);
        self.property_index.index_node(&node);
        self.ensure_node_slot(raw as usize);
        self.nodes[raw as usize] = Some(node);
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Set one property, keeping indexes current. Returns the previous value.
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        let value = value.into();
        let node = self
            .nodes
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NodeNotFound(id))?;
        let label = node.label.clone();
        let old = node.set_property(key, value.clone());

        if let Some(old) = &old {
            self.property_index.index_remove(&label, key, old, id);
        }
        self.property_index.index_insert(&label, key, &value, id);
        self.record(Undo::SetProperty {
            node: id,
            key: key.to_string(),
            old: old.clone(),
        });
        Ok(old)
    }

    fn restore_property(&mut self, id: NodeId, key: String, old: Option<PropertyValue>) {
        let Some(node) = self.nodes.get_mut(id.as_u64() as usize).and_then(Option::as_mut) else {
            return;
        };
        let label = node.label.clone();
        let current = match &old {
            Some(value) => node.properties.insert(key.clone(), value.clone()),
            None => node.properties.shift_remove(&key),
        };
        if let Some(current) = &current {
            self.property_index.index_remove(&label, &key, current, id);
        }
        if let Some(old) = &old {
            self.property_index.index_insert(&label, &key, old, id);
        }
    }

    /// All nodes with `label` whose properties contain every entry of `keys`,
    /// in id order. Uses a property index when one covers any of the keys.
    pub fn find_nodes(&self, label: &Label, keys: &PropertyMap) -> Vec<&Node> {
        let candidates: Vec<NodeId> = keys
            .iter()
            .find_map(|(key, value)| self.property_index.lookup(label, key, value))
            .unwrap_or_else(|| {
                self.label_index
                    .get(label)
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default()
            });

        let mut found: Vec<&Node> = candidates
            .into_iter()
            .filter_map(|id| self.get_node(id))
            .filter(|node| node.has_label(label) && node.matches(keys))
            .collect();
        found.sort_by_key(|node| node.id);
        found
    }

    /// Match-or-create a node keyed on `keys`.
    ///
    /// Returns the id and whether the node was created by this call. A new
    /// node starts with exactly the key properties.
    pub fn merge_node(&mut self, label: impl Into<Label>, keys: &PropertyMap) -> (NodeId, bool) {
        let label = label.into();
        if let Some(existing) = self.find_nodes(&label, keys).first() {
            return (existing.id, false);
        }
        (self.create_node(label, keys.clone()), true)
    }

    /// Delete a node and every edge attached to it
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<Node> {
        let idx = id.as_u64() as usize;
        if !self.has_node(id) {
            return Err(GraphError::NodeNotFound(id));
        }

        let outgoing = std::mem::take(&mut self.outgoing[idx]);
        let incoming = std::mem::take(&mut self.incoming[idx]);
        for edge_id in outgoing.iter().chain(incoming.iter()) {
            // A self-loop shows up in both lists; the second delete is a no-op.
            let _ = self.delete_edge(*edge_id);
        }

        let node = self.nodes[idx].take().ok_or(GraphError::NodeNotFound(id))?;
        if let Some(set) = self.label_index.get_mut(&node.label) {
            set.remove(&id);
        }
        self.property_index.unindex_node(&node);
        self.free_node_ids.push(id.as_u64());
        if self.journal.is_some() {
            self.record(Undo::DeleteNode(node.clone()));
        }
        Ok(node)
    }

    /// Create an edge between two nodes
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let raw = self.free_edge_ids.pop().unwrap_or_else(|| {
            let id = self.next_edge_id;
            self.next_edge_id += 1;
            id
        });
        let edge_id = EdgeId::new(raw);
        self.link_edge(Edge::new(edge_id, source, target, edge_type));
        self.record(Undo::CreateEdge(edge_id));
        Ok(edge_id)
    }

    fn link_edge(&mut self, edge: Edge) {
        let idx = edge.id.as_u64() as usize;
        self.outgoing[edge.source.as_u64() as usize].push(edge.id);
        self.incoming[edge.target.as_u64() as usize].push(edge.id);
        self.edge_type_index
            .entry(edge.edge_type.clone())
            .or_default()
            .insert(edge.id);

        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }
        self.edges[idx] = Some(edge);
    }

    /// Endpoints are restored before their edges, so both exist here.
    fn restore_edge(&mut self, edge: Edge) {
        let raw = edge.id.as_u64();
        self.free_edge_ids.retain(|&id| id != raw);
        self.link_edge(edge);
    }

    /// Match-or-create the edge `source -[edge_type]-> target`.
    ///
    /// Never produces a second edge of the same type between the same pair.
    pub fn merge_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<(EdgeId, bool)> {
        let edge_type = edge_type.into();
        let existing = self
            .get_outgoing_edges(source)
            .into_iter()
            .find(|e| e.links(source, target, &edge_type))
            .map(|e| e.id);
        match existing {
            Some(id) => Ok((id, false)),
            None => Ok((self.create_edge(source, target, edge_type)?, true)),
        }
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    /// Delete an edge
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        self.free_edge_ids.push(id.as_u64());
        if let Some(set) = self.edge_type_index.get_mut(&edge.edge_type) {
            set.remove(&id);
        }
        if let Some(adj) = self.outgoing.get_mut(edge.source.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        if let Some(adj) = self.incoming.get_mut(edge.target.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        if self.journal.is_some() {
            self.record(Undo::DeleteEdge(edge.clone()));
        }
        Ok(edge)
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.as_u64() as usize)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.incoming
            .get(node_id.as_u64() as usize)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get all nodes with a specific label
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// Get all edges of a specific type
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
