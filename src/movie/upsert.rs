//! Replace-style writes of canonical movies

use std::sync::Arc;
use tracing::debug;

use super::record::CanonicalMovie;
use crate::error::StoreResult;
use crate::store::{GraphStoreClient, Statement};

/// Writes movies so that at most one `Movie` node exists per `(name, year)`.
///
/// An upsert is a full replace: the existing node and all its edges are
/// detach-deleted, then the node is recreated with its `IS_OF_GENRE` and
/// `DIRECTED_BY` edges. `Genre` and `Director` nodes are shared and never
/// deleted. Both statements run in one transaction, so readers never see
/// the movie missing halfway through a replace.
pub struct MovieUpsertService {
    client: Arc<dyn GraphStoreClient>,
    database: Option<String>,
}

impl MovieUpsertService {
    pub fn new(client: Arc<dyn GraphStoreClient>) -> Self {
        Self {
            client,
            database: None,
        }
    }

    /// Write to `database` instead of the client's default
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Replace the movie in the store. Returns once the store has
    /// acknowledged the commit.
    pub async fn upsert(&self, movie: &CanonicalMovie) -> StoreResult<()> {
        debug!(movie = %movie.title(), "upserting");
        self.client
            .execute_all(&replace_statements(movie), self.database.as_deref())
            .await
    }
}

/// Delete-then-merge statement pair for one movie
pub fn replace_statements(movie: &CanonicalMovie) -> [Statement; 2] {
    [
        Statement::DeleteMovie {
            name: movie.name.clone(),
            year: movie.year.clone(),
        },
        Statement::MergeMovie {
            name: movie.name.clone(),
            year: movie.year.clone(),
            box_office: movie.box_office.clone(),
            runtime: movie.runtime.clone(),
            review_score: movie.review_score,
            genre: movie.genre.clone(),
            director: movie.director.clone(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_statements_delete_first() {
        let movie = CanonicalMovie {
            name: "Us".into(),
            year: "2019".into(),
            genre: "Horror".into(),
            director: "Jordan Peele".into(),
            release_date: None,
            box_office: None,
            runtime: Some("1h56m".into()),
            review_score: 93.0,
            watch_providers: vec![],
        };
        let [delete, merge] = replace_statements(&movie);
        assert_eq!(
            delete,
            Statement::DeleteMovie { name: "Us".into(), year: "2019".into() }
        );
        match merge {
            Statement::MergeMovie { runtime, review_score, .. } => {
                assert_eq!(runtime.as_deref(), Some("1h56m"));
                assert_eq!(review_score, 93.0);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }
}
