//! Neo4jClient: Bolt client for a running Neo4j server
//!
//! Built on the `neo4rs` connection pool. Each call checks a connection out
//! of the pool for exactly one statement (or one transaction) and hands it
//! back when the call returns, whatever the outcome.

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, Query};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::client::GraphStoreClient;
use super::models::{QueryResult, StoreStats};
use super::statement::{ColumnKind, Statement};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::graph::PropertyValue;

/// Keeps the pool small; ingestion is strictly sequential.
const MAX_CONNECTIONS: usize = 4;

/// Network client for a Neo4j server.
pub struct Neo4jClient {
    graph: RwLock<Option<Graph>>,
    database: Option<String>,
}

impl Neo4jClient {
    /// Connect and verify the server answers within `config.connect_timeout`.
    ///
    /// `Graph::connect` only builds the pool; the `RETURN 1` round trip
    /// forces a real Bolt handshake so bad credentials or an unreachable
    /// server fail here rather than on the first ingested record. The pool
    /// retries refused connections with backoff, hence the outer bound.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match tokio::time::timeout(config.connect_timeout, Self::handshake(config)).await {
            Ok(connected) => connected,
            Err(_) => {
                warn!(uri = %config.uri, timeout = ?config.connect_timeout, "connect timed out");
                Err(StoreError::Connection(format!(
                    "{} did not answer within {:?}",
                    config.uri, config.connect_timeout
                )))
            }
        }
    }

    async fn handshake(config: &StoreConfig) -> StoreResult<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(MAX_CONNECTIONS);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo4j_config = builder
            .build()
            .map_err(|e| StoreError::Connection(format!("invalid configuration: {e}")))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| StoreError::Connection(format!("failed to create pool for {}: {e}", config.uri)))?;

        graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .map_err(|e| StoreError::Connection(format!("{} is not responding: {e}", config.uri)))?;

        info!(uri = %config.uri, database = ?config.database, "connected to Neo4j");
        Ok(Self {
            graph: RwLock::new(Some(graph)),
            database: config.database.clone(),
        })
    }

    async fn graph(&self) -> StoreResult<Graph> {
        self.graph.read().await.clone().ok_or(StoreError::Closed)
    }

    #[cfg(test)]
    fn closed() -> Self {
        Self {
            graph: RwLock::new(None),
            database: None,
        }
    }

    fn target<'a>(&'a self, database: Option<&'a str>) -> Option<&'a str> {
        database.or(self.database.as_deref())
    }
}

fn to_bolt(value: PropertyValue) -> BoltType {
    match value {
        PropertyValue::String(s) => s.into(),
        PropertyValue::Float(f) => f.into(),
        PropertyValue::Integer(i) => i.into(),
        PropertyValue::Null => BoltType::Null(BoltNull),
    }
}

/// Render a statement as a `neo4rs` query with its parameters bound
fn build_query(statement: &Statement) -> Query {
    statement
        .params()
        .into_iter()
        .fold(neo4rs::query(statement.cypher()), |q, (key, value)| {
            q.param(key, to_bolt(value))
        })
}

fn decode_row(statement: &Statement, row: &neo4rs::Row) -> StoreResult<Vec<serde_json::Value>> {
    statement
        .columns()
        .iter()
        .map(|(column, kind)| {
            let decoded = match kind {
                ColumnKind::String => row
                    .get::<Option<String>>(column)
                    .map(|v| v.map(serde_json::Value::String)),
                ColumnKind::Float => row
                    .get::<Option<f64>>(column)
                    .map(|v| v.map(|f| PropertyValue::Float(f).to_json())),
            };
            decoded
                .map(|v| v.unwrap_or(serde_json::Value::Null))
                .map_err(|e| StoreError::Decode(format!("column `{column}`: {e}")))
        })
        .collect()
}

fn report(statement: &Statement, error: StoreError) -> StoreError {
    warn!(statement = statement.name(), error = %error, "statement failed");
    error
}

fn report_txn(statements: &[Statement], error: StoreError) -> StoreError {
    warn!(statements = statements.len(), error = %error, "transaction failed");
    error
}

impl Neo4jClient {
    async fn run_statement(&self, graph: &Graph, statement: &Statement, database: Option<&str>) -> StoreResult<QueryResult> {
        let query = build_query(statement);
        let mut result = QueryResult::new(
            statement
                .columns()
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        );

        if statement.is_write() {
            match database {
                Some(db) => graph.run_on(db, query).await?,
                None => graph.run(query).await?,
            }
            return Ok(result);
        }

        let mut stream = match database {
            Some(db) => graph.execute_on(db, query).await?,
            None => graph.execute(query).await?,
        };
        while let Some(row) = stream.next().await? {
            result.records.push(decode_row(statement, &row)?);
        }
        Ok(result)
    }

    async fn count(&self, graph: &Graph, cypher: &str) -> StoreResult<u64> {
        let query = neo4rs::query(cypher);
        let mut stream = match self.database.as_deref() {
            Some(db) => graph.execute_on(db, query).await?,
            None => graph.execute(query).await?,
        };
        let Some(row) = stream.next().await? else {
            return Ok(0);
        };
        let count: i64 = row
            .get("count")
            .map_err(|e| StoreError::Decode(format!("column `count`: {e}")))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl GraphStoreClient for Neo4jClient {
    async fn execute_on(&self, statement: &Statement, database: Option<&str>) -> StoreResult<QueryResult> {
        let graph = self.graph().await.map_err(|e| report(statement, e))?;
        let database = self.target(database);
        debug!(statement = statement.name(), database = ?database, "executing on Neo4j");

        self.run_statement(&graph, statement, database)
            .await
            .map_err(|e| report(statement, e))
    }

    async fn execute_all(&self, statements: &[Statement], database: Option<&str>) -> StoreResult<()> {
        let graph = self.graph().await.map_err(|e| report_txn(statements, e))?;
        let database = self.target(database);

        let started = match database {
            Some(db) => graph.start_txn_on(db).await,
            None => graph.start_txn().await,
        };
        let mut txn = started.map_err(|e| report_txn(statements, e.into()))?;

        for statement in statements {
            debug!(statement = statement.name(), database = ?database, "executing in Neo4j transaction");
            if let Err(e) = txn.run(build_query(statement)).await {
                let error = report(statement, e.into());
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "rollback failed");
                }
                return Err(error);
            }
        }

        txn.commit().await.map_err(|e| {
            warn!(error = %e, "commit failed");
            StoreError::from(e)
        })
    }

    async fn status(&self) -> StoreResult<StoreStats> {
        let graph = self.graph().await?;
        Ok(StoreStats {
            nodes: self.count(&graph, "MATCH (n) RETURN count(n) AS count").await?,
            edges: self.count(&graph, "MATCH ()-[r]->() RETURN count(r) AS count").await?,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        let graph = self.graph().await?;
        graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn close(&self) {
        // Dropping the last handle drains the pool.
        if self.graph.write().await.take().is_some() {
            info!("Neo4j client closed");
        }
    }
}
