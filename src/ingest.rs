//! Ingestion: normalize, write and export movie records one at a time

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::crawl::CatalogCrawler;
use crate::error::{CrawlError, StoreError, ValidationError};
use crate::movie::{CanonicalMovie, MovieNormalizer, MovieUpsertService, RawMovie};

/// Destination for every movie that made it into the store
pub trait RecordSink: Send {
    fn emit(&mut self, movie: &CanonicalMovie) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: BufWriter<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl JsonLinesSink<File> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, movie: &CanonicalMovie) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, movie)?;
        self.writer.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// What happened to one raw record
#[derive(Debug)]
pub enum RecordOutcome {
    Stored(CanonicalMovie),
    /// The record was unusable; nothing was written
    Rejected(ValidationError),
    /// The store refused the write
    Failed { movie: CanonicalMovie, error: StoreError },
}

/// Per-run counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub stored: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Detail pages that could not be fetched
    pub fetch_failed: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.stored + self.rejected + self.failed + self.fetch_failed
    }

    /// Records reached the store but none were accepted
    pub fn all_failed(&self) -> bool {
        self.stored == 0 && self.failed > 0
    }
}

/// Drives records through normalize -> upsert -> sink, sequentially.
///
/// A bad record never stops the run: validation failures and store
/// failures are counted and logged, and the next record is processed.
pub struct Ingestor {
    upsert: MovieUpsertService,
    sink: Option<Box<dyn RecordSink>>,
    report: IngestReport,
}

impl Ingestor {
    pub fn new(upsert: MovieUpsertService) -> Self {
        Self {
            upsert,
            sink: None,
            report: IngestReport::default(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn report(&self) -> IngestReport {
        self.report
    }

    /// Process one raw record to completion
    pub async fn ingest(&mut self, raw: &RawMovie) -> RecordOutcome {
        let movie = match MovieNormalizer::normalize(raw) {
            Ok(movie) => movie,
            Err(e) => {
                warn!(name = ?raw.name, error = %e, "rejecting record");
                self.report.rejected += 1;
                return RecordOutcome::Rejected(e);
            }
        };

        if let Err(error) = self.upsert.upsert(&movie).await {
            warn!(movie = %movie.title(), error = %error, "failed to store movie");
            self.report.failed += 1;
            return RecordOutcome::Failed { movie, error };
        }

        info!(movie = %movie.title(), genre = %movie.genre, score = movie.review_score, "stored movie");
        self.report.stored += 1;
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.emit(&movie) {
                warn!(movie = %movie.title(), error = %e, "failed to export record");
            }
        }
        RecordOutcome::Stored(movie)
    }

    /// Ingest records in order
    pub async fn ingest_all<I>(&mut self, records: I) -> IngestReport
    where
        I: IntoIterator<Item = RawMovie>,
    {
        for raw in records {
            self.ingest(&raw).await;
        }
        self.report
    }

    /// Ingest a JSON array of raw records.
    ///
    /// Only a document that is not an array fails as a whole. An element
    /// that does not deserialize as a record is counted as rejected and the
    /// rest of the array is still ingested.
    pub async fn ingest_json(&mut self, text: &str) -> Result<IngestReport, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
        for (position, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawMovie>(value) {
                Ok(raw) => {
                    self.ingest(&raw).await;
                }
                Err(e) => {
                    let error = ValidationError::Malformed(e.to_string());
                    warn!(position, error = %error, "rejecting record");
                    self.report.rejected += 1;
                }
            }
        }
        Ok(self.report)
    }

    /// Crawl the catalog and ingest each movie as soon as its page is
    /// fetched. Only a failure to fetch the catalog itself aborts.
    pub async fn ingest_crawl(&mut self, crawler: &CatalogCrawler) -> Result<IngestReport, CrawlError> {
        let entries = crawler.discover().await?;
        info!(movies = entries.len(), "catalog discovered");

        for entry in &entries {
            match crawler.fetch_movie(entry).await {
                Ok(raw) => {
                    self.ingest(&raw).await;
                }
                Err(e) => {
                    warn!(url = %entry.url, error = %e, "failed to fetch movie page");
                    self.report.fetch_failed += 1;
                }
            }
        }
        Ok(self.report)
    }

    /// Flush the sink and return the final counters
    pub fn finish(mut self) -> io::Result<IngestReport> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        let report = self.report;
        info!(
            stored = report.stored,
            rejected = report.rejected,
            failed = report.failed,
            fetch_failed = report.fetch_failed,
            "ingestion finished"
        );
        Ok(report)
    }
}
