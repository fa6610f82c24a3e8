//! Cinegraph
//!
//! Crawls a movie catalog, stores every movie in a property graph together
//! with its genre and director, and recommends movies that share a genre and
//! score close to a given title.
//!
//! # Architecture
//!
//! - `crawl`: HTTP fetch + HTML extraction into raw attribute bags
//! - `movie`: normalization, upsert and similarity services
//! - `store`: the `GraphStoreClient` seam, with a Neo4j (Bolt) client and
//!   an in-process client backed by `graph::GraphStore`
//! - `ingest`: drives records through normalize -> upsert -> sink
//!
//! ## Graph model
//!
//! - `(:Movie {name, year, boxOffice, runtime, reviewScore})`
//! - `(:Movie)-[:IS_OF_GENRE]->(:Genre {name})`
//! - `(:Movie)-[:DIRECTED_BY]->(:Director {name})`
//!
//! ## Example Usage
//!
//! ```rust
//! use cinegraph::movie::{MovieNormalizer, MovieUpsertService, RawMovie, SimilarityQueryService};
//! use cinegraph::store::EmbeddedClient;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//!     let client = Arc::new(EmbeddedClient::new());
//!     let upsert = MovieUpsertService::new(client.clone());
//!
//!     for (name, score) in [("Alien", "93%"), ("Aliens", "97%")] {
//!         let raw = RawMovie {
//!             name: Some(name.into()),
//!             review_score_percent_string: Some(score.into()),
//!             year_parenthesized: Some("(1979)".into()),
//!             genre_raw: Some("Sci-Fi".into()),
//!             director_name: Some("Ridley Scott".into()),
//!             ..RawMovie::default()
//!         };
//!         let movie = MovieNormalizer::normalize(&raw).unwrap();
//!         upsert.upsert(&movie).await.unwrap();
//!     }
//!
//!     let similar = SimilarityQueryService::new(client).find_similar("Alien").await.unwrap();
//!     assert_eq!(similar[0].name, "Aliens");
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod crawl;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod movie;
pub mod store;

// Re-export main types for convenience
pub use config::{CrawlConfig, StoreConfig};
pub use crawl::CatalogCrawler;
pub use error::{CinegraphError, ConfigError, CrawlError, Result, StoreError, StoreResult, ValidationError};
pub use graph::{Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label, Node, NodeId, PropertyMap, PropertyValue};
pub use ingest::{IngestReport, Ingestor, JsonLinesSink, RecordOutcome, RecordSink};
pub use movie::{CanonicalMovie, MovieNormalizer, MovieUpsertService, RawMovie, SimilarMovie, SimilarityQueryService};
pub use store::{EmbeddedClient, GraphStoreClient, Neo4jClient, QueryResult, Statement, StoreStats};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
