//! In-memory property graph
//!
//! Backs [`crate::store::EmbeddedClient`]:
//! - Labelled nodes with properties
//! - Typed, directed edges without properties
//! - Hash-based label and edge-type indexes
//! - Exact-match property indexes on `(label, property)`

pub mod edge;
pub mod index;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

pub use edge::Edge;
pub use index::IndexManager;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
