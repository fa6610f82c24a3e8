//! The statements cinegraph runs against a graph store.
//!
//! Each statement renders to parameterized Cypher for Bolt servers and is
//! interpreted natively by the embedded store. Values never get spliced
//! into query text.

use crate::graph::PropertyValue;

pub const MOVIE: &str = "Movie";
pub const GENRE: &str = "Genre";
pub const DIRECTOR: &str = "Director";
pub const IS_OF_GENRE: &str = "IS_OF_GENRE";
pub const DIRECTED_BY: &str = "DIRECTED_BY";

/// Movie node property keys
pub mod props {
    pub const NAME: &str = "name";
    pub const YEAR: &str = "year";
    pub const BOX_OFFICE: &str = "boxOffice";
    pub const RUNTIME: &str = "runtime";
    pub const REVIEW_SCORE: &str = "reviewScore";
}

const DELETE_MOVIE: &str = "\
MATCH (movie:Movie {name: $name, year: $year})
DETACH DELETE movie";

const MERGE_MOVIE: &str = "\
MERGE (movie:Movie {name: $name, year: $year})
ON CREATE SET movie.boxOffice = $boxOffice, movie.runtime = $runtime, movie.reviewScore = $reviewScore
WITH movie
MERGE (genre:Genre {name: $genre})
MERGE (movie)-[:IS_OF_GENRE]->(genre)
WITH movie
MERGE (director:Director {name: $director})
MERGE (movie)-[:DIRECTED_BY]->(director)";

const SIMILAR_MOVIES: &str = "\
MATCH (movie:Movie {name: $name})-[:IS_OF_GENRE]->(:Genre)<-[:IS_OF_GENRE]-(similar:Movie)
WHERE similar <> movie
  AND abs(toFloat(similar.reviewScore) - toFloat(movie.reviewScore)) <= $tolerance
RETURN DISTINCT similar.name AS name, similar.year AS year, toFloat(similar.reviewScore) AS score
ORDER BY score DESC, name ASC, year ASC
LIMIT $limit";

/// Type of a result column, used by drivers that decode rows column by column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Float,
}

/// A parameterized statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Detach-delete the movie with this exact identity
    DeleteMovie { name: String, year: String },

    /// Match-or-create a movie plus its genre and director edges.
    /// Attributes are only written when the movie node is created.
    MergeMovie {
        name: String,
        year: String,
        box_office: Option<String>,
        runtime: Option<String>,
        review_score: f64,
        genre: String,
        director: String,
    },

    /// Movies sharing a genre with `name` whose score is within `tolerance`
    SimilarMovies {
        name: String,
        tolerance: f64,
        limit: usize,
    },
}

impl Statement {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Statement::DeleteMovie { .. } => "delete_movie",
            Statement::MergeMovie { .. } => "merge_movie",
            Statement::SimilarMovies { .. } => "similar_movies",
        }
    }

    pub fn cypher(&self) -> &'static str {
        match self {
            Statement::DeleteMovie { .. } => DELETE_MOVIE,
            Statement::MergeMovie { .. } => MERGE_MOVIE,
            Statement::SimilarMovies { .. } => SIMILAR_MOVIES,
        }
    }

    /// Parameters bound to the `$placeholders` of [`Statement::cypher`]
    pub fn params(&self) -> Vec<(&'static str, PropertyValue)> {
        match self {
            Statement::DeleteMovie { name, year } => vec![
                ("name", name.as_str().into()),
                ("year", year.as_str().into()),
            ],
            Statement::MergeMovie {
                name,
                year,
                box_office,
                runtime,
                review_score,
                genre,
                director,
            } => vec![
                ("name", name.as_str().into()),
                ("year", year.as_str().into()),
                ("boxOffice", box_office.clone().into()),
                ("runtime", runtime.clone().into()),
                ("reviewScore", (*review_score).into()),
                ("genre", genre.as_str().into()),
                ("director", director.as_str().into()),
            ],
            Statement::SimilarMovies { name, tolerance, limit } => vec![
                ("name", name.as_str().into()),
                ("tolerance", (*tolerance).into()),
                ("limit", PropertyValue::Integer(*limit as i64)),
            ],
        }
    }

    /// Columns returned by the statement; empty for writes
    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            Statement::SimilarMovies { .. } => &[
                ("name", ColumnKind::String),
                ("year", ColumnKind::String),
                ("score", ColumnKind::Float),
            ],
            _ => &[],
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Statement::SimilarMovies { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(cypher: &str) -> Vec<String> {
        let mut out: Vec<String> = cypher
            .split('$')
            .skip(1)
            .map(|rest| {
                rest.chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect()
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn merge() -> Statement {
        Statement::MergeMovie {
            name: "Get Out".into(),
            year: "2017".into(),
            box_office: Some("$176.0M".into()),
            runtime: None,
            review_score: 98.0,
            genre: "Horror".into(),
            director: "Jordan Peele".into(),
        }
    }

    #[test]
    fn test_params_cover_every_placeholder() {
        let statements = vec![
            Statement::DeleteMovie { name: "Get Out".into(), year: "2017".into() },
            merge(),
            Statement::SimilarMovies { name: "Get Out".into(), tolerance: 10.0, limit: 5 },
        ];
        for stmt in statements {
            let mut bound: Vec<String> = stmt.params().iter().map(|(k, _)| k.to_string()).collect();
            bound.sort();
            assert_eq!(placeholders(stmt.cypher()), bound, "{}", stmt.name());
        }
    }

    #[test]
    fn test_absent_runtime_binds_null() {
        let params = merge().params();
        let runtime = params.iter().find(|(k, _)| *k == "runtime").unwrap();
        assert!(runtime.1.is_null());
    }

    #[test]
    fn test_only_similarity_returns_columns() {
        assert!(merge().columns().is_empty());
        assert!(merge().is_write());
        let similar = Statement::SimilarMovies { name: "x".into(), tolerance: 10.0, limit: 5 };
        assert!(!similar.is_write());
        let names: Vec<&str> = similar.columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["name", "year", "score"]);
    }
}
