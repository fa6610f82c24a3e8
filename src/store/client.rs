//! GraphStoreClient trait, the seam between cinegraph and a graph database

use async_trait::async_trait;

use super::models::{QueryResult, StoreStats};
use super::statement::Statement;
use crate::error::StoreResult;

/// Unified client interface for graph stores.
///
/// Implemented by:
/// - `EmbeddedClient`: in-process graph, no network (tests, demos)
/// - `Neo4jClient`: a Neo4j server over Bolt
///
/// Every failure comes back as an `Err`; an `Ok` with no rows always means
/// the statement ran and matched nothing. Implementations log failed
/// statements before returning them.
#[async_trait]
pub trait GraphStoreClient: Send + Sync {
    /// Run one statement on a scoped session against `database`
    /// (`None` = the client's default database).
    async fn execute_on(&self, statement: &Statement, database: Option<&str>) -> StoreResult<QueryResult>;

    /// Run `statements` in order inside one transaction. Either all of them
    /// take effect or none do.
    async fn execute_all(&self, statements: &[Statement], database: Option<&str>) -> StoreResult<()>;

    /// Node and relationship counts
    async fn status(&self) -> StoreResult<StoreStats>;

    /// Round-trip to the store
    async fn ping(&self) -> StoreResult<()>;

    /// Release all resources. Idempotent; later calls fail with `StoreError::Closed`.
    async fn close(&self);

    /// Run one statement against the default database
    async fn execute(&self, statement: &Statement) -> StoreResult<QueryResult> {
        self.execute_on(statement, None).await
    }
}
