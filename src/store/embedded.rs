//! EmbeddedClient: in-process graph store client
//!
//! Interprets [`Statement`]s directly against a [`GraphStore`], no network
//! and no Cypher parsing. Semantics match the Cypher each statement
//! renders to, so tests against this client hold for a Bolt server too.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use rustc_hash::FxHashSet;

use super::client::GraphStoreClient;
use super::models::{QueryResult, StoreStats};
use super::statement::{props, Statement, DIRECTED_BY, DIRECTOR, GENRE, IS_OF_GENRE, MOVIE};
use crate::error::{StoreError, StoreResult};
use crate::graph::{EdgeType, GraphError, GraphStore, Label, PropertyMap, PropertyValue};

impl From<GraphError> for StoreError {
    fn from(e: GraphError) -> Self {
        StoreError::Query(e.to_string())
    }
}

/// In-process client that wraps a GraphStore directly.
pub struct EmbeddedClient {
    store: Arc<RwLock<GraphStore>>,
    closed: AtomicBool,
}

impl EmbeddedClient {
    /// Create a new EmbeddedClient with a fresh empty graph store
    pub fn new() -> Self {
        Self::with_store(GraphStore::new())
    }

    /// Create an EmbeddedClient that takes ownership of an existing store.
    ///
    /// Every merge key is `name`, so it is indexed for each label.
    pub fn with_store(mut store: GraphStore) -> Self {
        for label in [MOVIE, GENRE, DIRECTOR] {
            store.create_index(label, props::NAME);
        }
        Self {
            store: Arc::new(RwLock::new(store)),
            closed: AtomicBool::new(false),
        }
    }

    /// Acquire a read lock on the store for direct inspection.
    pub async fn store_read(&self) -> tokio::sync::RwLockReadGuard<'_, GraphStore> {
        self.store.read().await
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Default for EmbeddedClient {
    fn default() -> Self {
        Self::new()
    }
}

fn movie_keys(name: &str, year: &str) -> PropertyMap {
    let mut keys = PropertyMap::new();
    keys.insert(props::NAME.to_string(), name.into());
    keys.insert(props::YEAR.to_string(), year.into());
    keys
}

fn name_key(name: &str) -> PropertyMap {
    let mut keys = PropertyMap::new();
    keys.insert(props::NAME.to_string(), name.into());
    keys
}

/// Apply a write statement
fn apply(store: &mut GraphStore, statement: &Statement) -> StoreResult<QueryResult> {
    match statement {
        Statement::DeleteMovie { name, year } => {
            let ids: Vec<_> = store
                .find_nodes(&Label::new(MOVIE), &movie_keys(name, year))
                .iter()
                .map(|n| n.id)
                .collect();
            for id in ids {
                store.delete_node(id)?;
            }
        }
        Statement::MergeMovie {
            name,
            year,
            box_office,
            runtime,
            review_score,
            genre,
            director,
        } => {
            let (movie, created) = store.merge_node(MOVIE, &movie_keys(name, year));
            if created {
                // A null SET leaves the property absent, as on a Bolt server.
                if let Some(box_office) = box_office {
                    store.set_property(movie, props::BOX_OFFICE, box_office.as_str())?;
                }
                if let Some(runtime) = runtime {
                    store.set_property(movie, props::RUNTIME, runtime.as_str())?;
                }
                store.set_property(movie, props::REVIEW_SCORE, *review_score)?;
            }

            let (genre, _) = store.merge_node(GENRE, &name_key(genre));
            store.merge_edge(movie, genre, IS_OF_GENRE)?;

            let (director, _) = store.merge_node(DIRECTOR, &name_key(director));
            store.merge_edge(movie, director, DIRECTED_BY)?;
        }
        Statement::SimilarMovies { .. } => return Ok(query(store, statement)),
    }
    Ok(QueryResult::default())
}

/// Apply `statements` as one unit: either all of them take effect or,
/// on the first failure, none do.
fn transact(store: &mut GraphStore, statements: &[Statement]) -> StoreResult<()> {
    store.begin();
    for statement in statements {
        debug!(statement = statement.name(), "executing in embedded transaction");
        if let Err(e) = apply(store, statement) {
            warn!(statement = statement.name(), error = %e, "statement failed, rolling back");
            store.rollback();
            return Err(e);
        }
    }
    store.commit();
    Ok(())
}

/// Evaluate a read statement
fn query(store: &GraphStore, statement: &Statement) -> QueryResult {
    let mut result = QueryResult::new(
        statement
            .columns()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect(),
    );

    let Statement::SimilarMovies { name, tolerance, limit } = statement else {
        return result;
    };

    let genre_edge = EdgeType::new(IS_OF_GENRE);
    let genre_label = Label::new(GENRE);
    let movie_label = Label::new(MOVIE);

    let mut seen: FxHashSet<(String, String, u64)> = FxHashSet::default();
    let mut hits: Vec<(String, String, f64)> = Vec::new();

    for source in store.find_nodes(&movie_label, &name_key(name)) {
        let Some(source_score) = source.get_property(props::REVIEW_SCORE).and_then(PropertyValue::as_float) else {
            continue;
        };
        for to_genre in store.get_outgoing_edges(source.id) {
            if to_genre.edge_type != genre_edge {
                continue;
            }
            let Some(genre) = store.get_node(to_genre.target).filter(|g| g.has_label(&genre_label)) else {
                continue;
            };
            for from_movie in store.get_incoming_edges(genre.id) {
                if from_movie.edge_type != genre_edge {
                    continue;
                }
                let Some(similar) = store
                    .get_node(from_movie.source)
                    .filter(|m| m.id != source.id && m.has_label(&movie_label))
                else {
                    continue;
                };
                let Some(similar_name) = similar.get_property(props::NAME).and_then(PropertyValue::as_string) else {
                    continue;
                };
                let Some(score) = similar.get_property(props::REVIEW_SCORE).and_then(PropertyValue::as_float) else {
                    continue;
                };
                if (score - source_score).abs() > *tolerance {
                    continue;
                }
                let year = similar
                    .get_property(props::YEAR)
                    .and_then(PropertyValue::as_string)
                    .unwrap_or_default()
                    .to_string();
                if seen.insert((similar_name.to_string(), year.clone(), score.to_bits())) {
                    hits.push((similar_name.to_string(), year, score));
                }
            }
        }
    }

    hits.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });
    hits.truncate(*limit);

    result.records = hits
        .into_iter()
        .map(|(name, year, score)| {
            vec![
                serde_json::Value::String(name),
                serde_json::Value::String(year),
                PropertyValue::Float(score).to_json(),
            ]
        })
        .collect();
    result
}

#[async_trait]
impl GraphStoreClient for EmbeddedClient {
    async fn execute_on(&self, statement: &Statement, _database: Option<&str>) -> StoreResult<QueryResult> {
        self.ensure_open()?;
        debug!(statement = statement.name(), "executing on embedded store");

        if statement.is_write() {
            let mut store_guard = self.store.write().await;
            transact(&mut store_guard, std::slice::from_ref(statement))?;
            Ok(QueryResult::default())
        } else {
            let store_guard = self.store.read().await;
            Ok(query(&store_guard, statement))
        }
    }

    async fn execute_all(&self, statements: &[Statement], _database: Option<&str>) -> StoreResult<()> {
        self.ensure_open()?;
        let mut store_guard = self.store.write().await;
        transact(&mut store_guard, statements)
    }

    async fn status(&self) -> StoreResult<StoreStats> {
        self.ensure_open()?;
        let store_guard = self.store.read().await;
        Ok(StoreStats {
            nodes: store_guard.node_count() as u64,
            edges: store_guard.edge_count() as u64,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_open()
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("embedded store client closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(name: &str, year: &str, genre: &str, score: f64) -> Statement {
        Statement::MergeMovie {
            name: name.into(),
            year: year.into(),
            box_office: None,
            runtime: None,
            review_score: score,
            genre: genre.into(),
            director: "Someone".into(),
        }
    }

    fn similar(name: &str) -> Statement {
        Statement::SimilarMovies { name: name.into(), tolerance: 10.0, limit: 5 }
    }

    #[tokio::test]
    async fn test_embedded_ping_and_status() {
        let client = EmbeddedClient::new();
        client.ping().await.unwrap();
        let status = client.status().await.unwrap();
        assert_eq!(status, StoreStats::default());
    }

    #[tokio::test]
    async fn test_merge_creates_movie_genre_director() {
        let client = EmbeddedClient::new();
        client.execute(&merge("Halloween", "1978", "Horror", 96.0)).await.unwrap();

        let status = client.status().await.unwrap();
        assert_eq!(status.nodes, 3);
        assert_eq!(status.edges, 2);

        let store = client.store_read().await;
        let movies = store.find_nodes(&Label::new(MOVIE), &movie_keys("Halloween", "1978"));
        assert_eq!(movies[0].get_property(props::REVIEW_SCORE), Some(&PropertyValue::Float(96.0)));
        assert!(movies[0].get_property(props::RUNTIME).is_none());
    }

    #[tokio::test]
    async fn test_merge_does_not_overwrite_existing_movie() {
        let client = EmbeddedClient::new();
        client.execute(&merge("Halloween", "1978", "Horror", 96.0)).await.unwrap();
        client.execute(&merge("Halloween", "1978", "Horror", 12.0)).await.unwrap();

        let store = client.store_read().await;
        let movies = store.find_nodes(&Label::new(MOVIE), &movie_keys("Halloween", "1978"));
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].get_property(props::REVIEW_SCORE), Some(&PropertyValue::Float(96.0)));
    }

    #[tokio::test]
    async fn test_delete_keeps_shared_nodes() {
        let client = EmbeddedClient::new();
        client.execute(&merge("Halloween", "1978", "Horror", 96.0)).await.unwrap();
        client
            .execute(&Statement::DeleteMovie { name: "Halloween".into(), year: "1978".into() })
            .await
            .unwrap();

        let status = client.status().await.unwrap();
        assert_eq!(status.nodes, 2, "genre and director survive");
        assert_eq!(status.edges, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_movie_is_not_an_error() {
        let client = EmbeddedClient::new();
        let result = client
            .execute(&Statement::DeleteMovie { name: "Nope".into(), year: "2000".into() })
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_similar_returns_distinct_rows_for_shared_genres() {
        let client = EmbeddedClient::new();
        client.execute(&merge("Alien", "1979", "Horror", 98.0)).await.unwrap();
        client.execute(&merge("Alien", "1979", "SciFi", 98.0)).await.unwrap();
        client.execute(&merge("Aliens", "1986", "Horror", 97.0)).await.unwrap();
        client.execute(&merge("Aliens", "1986", "SciFi", 97.0)).await.unwrap();

        let result = client.execute(&similar("Alien")).await.unwrap();
        assert_eq!(result.columns, vec!["name", "year", "score"]);
        assert_eq!(result.len(), 1);
        let row = result.rows().next().unwrap();
        assert_eq!(row.get_str("name"), Some("Aliens"));
        assert_eq!(row.get_str("year"), Some("1986"));
        assert_eq!(row.get_f64("score"), Some(97.0));
    }

    #[tokio::test]
    async fn test_execute_all_replaces_movie() {
        let mut seeded = GraphStore::new();
        seeded.create_node(MOVIE, movie_keys("Saw", "2004"));
        let client = EmbeddedClient::with_store(seeded);

        client
            .execute_all(
                &[
                    Statement::DeleteMovie { name: "Saw".into(), year: "2004".into() },
                    merge("Saw", "2004", "Horror", 50.0),
                ],
                None,
            )
            .await
            .unwrap();

        let status = client.status().await.unwrap();
        assert_eq!(status.nodes, 3);
        assert_eq!(status.edges, 2);
        let store = client.store_read().await;
        let movies = store.find_nodes(&Label::new(MOVIE), &movie_keys("Saw", "2004"));
        assert_eq!(movies[0].get_property(props::REVIEW_SCORE), Some(&PropertyValue::Float(50.0)));
    }

    #[test]
    fn test_transact_closes_the_journal() {
        let mut store = GraphStore::new();
        transact(&mut store, &[merge("Saw", "2004", "Horror", 50.0)]).unwrap();
        assert!(!store.in_transaction());

        // Nothing recorded after commit, so a stray rollback is a no-op
        store.rollback();
        assert_eq!((store.node_count(), store.edge_count()), (3, 2));
    }

    #[tokio::test]
    async fn test_with_store_indexes_existing_names() {
        let mut seeded = GraphStore::new();
        seeded.create_node(MOVIE, movie_keys("Saw", "2004"));
        let client = EmbeddedClient::with_store(seeded);

        client.execute(&merge("Saw", "2004", "Horror", 50.0)).await.unwrap();
        let store = client.store_read().await;
        assert_eq!(store.find_nodes(&Label::new(MOVIE), &name_key("Saw")).len(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let client = EmbeddedClient::new();
        client.close().await;
        client.close().await;
        assert!(matches!(client.ping().await, Err(StoreError::Closed)));
        assert!(matches!(client.execute(&similar("Alien")).await, Err(StoreError::Closed)));
    }
}
