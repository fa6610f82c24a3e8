//! Genre + score similarity search

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{GraphStoreClient, QueryResult, Statement};

/// Maximum absolute score difference, inclusive
pub const SCORE_TOLERANCE: f64 = 10.0;
/// Maximum number of recommendations
pub const MAX_RESULTS: usize = 5;

/// One recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarMovie {
    pub name: String,
    pub year: String,
    pub score: f64,
}

/// Finds movies that share a genre with a given title and score close to it.
///
/// Results are ordered by score descending, then name and year ascending,
/// and capped at [`MAX_RESULTS`]. Every `Movie` node carrying the title
/// is used as a source, so a remake sharing the title can be recommended
/// for the original and vice versa. An unknown title yields an empty list.
pub struct SimilarityQueryService {
    client: Arc<dyn GraphStoreClient>,
    tolerance: f64,
    limit: usize,
    database: Option<String>,
}

impl SimilarityQueryService {
    pub fn new(client: Arc<dyn GraphStoreClient>) -> Self {
        Self {
            client,
            tolerance: SCORE_TOLERANCE,
            limit: MAX_RESULTS,
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub async fn find_similar(&self, movie_name: &str) -> StoreResult<Vec<SimilarMovie>> {
        let name = movie_name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let statement = Statement::SimilarMovies {
            name: name.to_string(),
            tolerance: self.tolerance,
            limit: self.limit,
        };
        let result = self
            .client
            .execute_on(&statement, self.database.as_deref())
            .await?;
        let similar = decode(&result)?;
        debug!(movie = name, found = similar.len(), "similarity query done");
        Ok(similar)
    }
}

fn decode(result: &QueryResult) -> StoreResult<Vec<SimilarMovie>> {
    result
        .rows()
        .map(|row| -> StoreResult<SimilarMovie> {
            let name = row
                .get_str("name")
                .ok_or_else(|| StoreError::Decode("similar movie without a name".into()))?;
            let score = row
                .get_f64("score")
                .ok_or_else(|| StoreError::Decode(format!("{name} has no numeric score")))?;
            Ok(SimilarMovie {
                name: name.to_string(),
                year: row.get_str("year").unwrap_or_default().to_string(),
                score,
            })
        })
        .collect()
}
