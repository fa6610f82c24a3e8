//! Catalog crawling
//!
//! Fetches the catalog page, then follows each listed movie to its detail
//! page. Requests are sequential with a fixed politeness delay before each
//! detail page; nothing here touches the graph store.

pub mod extract;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::movie::RawMovie;

pub use extract::{CatalogEntry, Selectors};

/// HTTP crawler for one catalog page and the movies it lists.
pub struct CatalogCrawler {
    http: Client,
    config: CrawlConfig,
    selectors: Selectors,
}

impl CatalogCrawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            selectors: Selectors::new()?,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        debug!(%url, "fetching");
        let body = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetch the catalog and list its movies, capped at `max_movies`.
    /// Rows that cannot be followed are logged and skipped.
    pub async fn discover(&self) -> Result<Vec<CatalogEntry>, CrawlError> {
        let seed = Url::parse(&self.config.seed_url)?;
        let html = self.fetch(&seed).await?;

        let mut entries: Vec<CatalogEntry> = self
            .selectors
            .parse_catalog(&html, &seed)
            .into_iter()
            .filter_map(|row| match row {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping catalog row");
                    None
                }
            })
            .collect();

        if let Some(max) = self.config.max_movies {
            entries.truncate(max);
        }
        debug!(seed = %seed, movies = entries.len(), "catalog parsed");
        Ok(entries)
    }

    /// Fetch one detail page and extract its raw record
    pub async fn fetch_movie(&self, entry: &CatalogEntry) -> Result<RawMovie, CrawlError> {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        let html = self.fetch(&entry.url).await?;
        Ok(self.selectors.parse_movie(&html, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_rejects_bad_seed() {
        let crawler = CatalogCrawler::new(CrawlConfig {
            seed_url: "not a url".into(),
            ..CrawlConfig::default()
        })
        .unwrap();
        assert!(matches!(crawler.discover().await, Err(CrawlError::InvalidUrl(_))));
    }
}
