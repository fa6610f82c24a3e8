use async_trait::async_trait;
use cinegraph::error::{StoreError, StoreResult, ValidationError};
use cinegraph::ingest::{Ingestor, JsonLinesSink, RecordOutcome};
use cinegraph::movie::{CanonicalMovie, MovieUpsertService, RawMovie, SimilarityQueryService};
use cinegraph::store::{EmbeddedClient, GraphStoreClient, QueryResult, Statement, StoreStats};
use std::sync::Arc;

const CATALOG_JSON: &str = r#"[
    {
        "name": "Get Out",
        "reviewScorePercentString": "98%",
        "yearParenthesized": "(2017)",
        "genreRaw": "Mystery & Thriller",
        "directorName": "Jordan Peele",
        "releaseDate": " Feb 24, 2017 ",
        "boxOfficeRaw": "$176.0M",
        "runtimeRaw": "1h 44m",
        "watchProviderImageList": ["peacock"]
    },
    {
        "name": "Us",
        "reviewScorePercentString": " 93% ",
        "yearParenthesized": "(2019)",
        "genreRaw": "Mystery & Thriller",
        "directorName": "Jordan Peele"
    },
    {
        "name": "Nope",
        "reviewScorePercentString": "--",
        "yearParenthesized": "(2022)",
        "genreRaw": "Sci-Fi",
        "directorName": "Jordan Peele"
    },
    {
        "name": "Candyman",
        "yearParenthesized": "(1992)",
        "genreRaw": "Horror",
        "directorName": "Bernard Rose"
    }
]"#;

/// Accepts reads, refuses every write
struct ReadOnlyClient;

#[async_trait]
impl GraphStoreClient for ReadOnlyClient {
    async fn execute_on(&self, _statement: &Statement, _database: Option<&str>) -> StoreResult<QueryResult> {
        Ok(QueryResult::default())
    }

    async fn execute_all(&self, _statements: &[Statement], _database: Option<&str>) -> StoreResult<()> {
        Err(StoreError::Query("write access denied".to_string()))
    }

    async fn status(&self) -> StoreResult<StoreStats> {
        Ok(StoreStats::default())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

fn records() -> Vec<RawMovie> {
    serde_json::from_str(CATALOG_JSON).unwrap()
}

#[tokio::test]
async fn test_offline_ingest_then_recommend() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("movies.jsonl");

    let client = Arc::new(EmbeddedClient::new());
    let mut ingestor = Ingestor::new(MovieUpsertService::new(client.clone()))
        .with_sink(Box::new(JsonLinesSink::create(&out).unwrap()));

    ingestor.ingest_all(records()).await;
    let report = ingestor.finish().unwrap();

    assert_eq!(report.stored, 2);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.failed, 0);
    assert!(!report.all_failed());

    let exported: Vec<CanonicalMovie> = std::fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].genre, "Mystery&Thriller");
    assert_eq!(exported[0].runtime.as_deref(), Some("1h44m"));
    assert_eq!(exported[0].release_date.as_deref(), Some("Feb 24, 2017"));
    assert_eq!(exported[1].runtime, None);

    // Reads come after every write has been acknowledged
    let similar = SimilarityQueryService::new(client.clone()).find_similar("Us").await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].name, "Get Out");
    assert_eq!(similar[0].score, 98.0);

    let stats = client.status().await.unwrap();
    // 2 movies, 1 genre, 1 director; each movie has 2 edges
    assert_eq!(stats.nodes, 4);
    assert_eq!(stats.edges, 4);
}

#[tokio::test]
async fn test_rejections_name_the_problem() {
    let client = Arc::new(EmbeddedClient::new());
    let mut ingestor = Ingestor::new(MovieUpsertService::new(client));
    let raw = records();

    assert!(matches!(
        ingestor.ingest(&raw[2]).await,
        RecordOutcome::Rejected(ValidationError::InvalidScore(_))
    ));
    assert!(matches!(
        ingestor.ingest(&raw[3]).await,
        RecordOutcome::Rejected(ValidationError::MissingField(_))
    ));
}

#[tokio::test]
async fn test_every_write_failing() {
    let mut ingestor = Ingestor::new(MovieUpsertService::new(Arc::new(ReadOnlyClient)));

    let report = ingestor.ingest_all(records()).await;

    assert_eq!(report.stored, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.rejected, 2);
    assert!(report.all_failed());
}

#[tokio::test]
async fn test_failed_write_keeps_going() {
    let mut ingestor = Ingestor::new(MovieUpsertService::new(Arc::new(ReadOnlyClient)));
    let raw = records();

    match ingestor.ingest(&raw[0]).await {
        RecordOutcome::Failed { movie, error } => {
            assert_eq!(movie.name, "Get Out");
            assert!(matches!(error, StoreError::Query(_)));
        }
        other => panic!("expected a failed write, got {:?}", other),
    }
    assert!(matches!(ingestor.ingest(&raw[1]).await, RecordOutcome::Failed { .. }));
    assert_eq!(ingestor.report().failed, 2);
}

#[tokio::test]
async fn test_badly_typed_element_is_rejected_alone() {
    let text = r#"[
        {
            "name": "Get Out",
            "reviewScorePercentString": "98%",
            "yearParenthesized": "(2017)",
            "genreRaw": "Mystery & Thriller",
            "directorName": "Jordan Peele"
        },
        {
            "name": "Us",
            "reviewScorePercentString": 93,
            "yearParenthesized": "(2019)",
            "genreRaw": "Mystery & Thriller",
            "directorName": "Jordan Peele",
            "watchProviderImageList": null
        },
        "not a record",
        {
            "name": "Nope",
            "reviewScorePercentString": "90%",
            "yearParenthesized": "(2022)",
            "genreRaw": "Mystery & Thriller",
            "directorName": "Jordan Peele"
        }
    ]"#;

    let client = Arc::new(EmbeddedClient::new());
    let mut ingestor = Ingestor::new(MovieUpsertService::new(client.clone()));
    let report = ingestor.ingest_json(text).await.unwrap();

    assert_eq!(report.stored, 2);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.failed, 0);

    let similar = SimilarityQueryService::new(client).find_similar("Get Out").await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].name, "Nope");
}

#[tokio::test]
async fn test_json_that_is_not_an_array_fails() {
    let mut ingestor = Ingestor::new(MovieUpsertService::new(Arc::new(EmbeddedClient::new())));
    assert!(ingestor.ingest_json(r#"{"name": "Us"}"#).await.is_err());
    assert_eq!(ingestor.report().total(), 0);
}
