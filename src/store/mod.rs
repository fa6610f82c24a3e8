//! Graph store clients
//!
//! Two implementations of [`GraphStoreClient`]:
//!
//! - **`EmbeddedClient`**: in-process, backed by [`crate::graph::GraphStore`].
//! - **`Neo4jClient`**: a Neo4j server over Bolt.
//!
//! Callers hold one client for the whole run and pass it to the services
//! explicitly; there is no process-wide connection.

pub mod client;
pub mod embedded;
pub mod models;
pub mod neo4j;
pub mod statement;

pub use client::GraphStoreClient;
pub use embedded::EmbeddedClient;
pub use models::{QueryResult, Row, StoreStats};
pub use neo4j::Neo4jClient;
pub use statement::{ColumnKind, Statement};
