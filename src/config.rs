//! Process configuration: graph store credentials and crawl settings

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USER: &str = "NEO4J_USER";
pub const ENV_PASSWORD: &str = "NEO4J_PWD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Catalog crawled when no seed is given.
pub const DEFAULT_SEED_URL: &str =
    "https://editorial.rottentomatoes.com/guide/best-horror-movies-of-all-time/";

/// Bound on connecting plus the first round trip to the store.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the graph store
#[derive(Clone, PartialEq)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Target database; `None` uses the server default
    pub database: Option<String>,
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(uri: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Read `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PWD` and optionally
    /// `NEO4J_DATABASE` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        Ok(Self {
            uri: required(ENV_URI)?,
            user: required(ENV_USER)?,
            password: required(ENV_PASSWORD)?,
            database: lookup(ENV_DATABASE).filter(|v| !v.trim().is_empty()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Crawl settings
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed_url: String,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between requests (politeness)
    pub delay: Duration,
    /// Maximum number of detail pages to follow
    pub max_movies: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            user_agent: format!("cinegraph/{}", crate::VERSION),
            timeout: Duration::from_secs(20),
            delay: Duration::from_millis(250),
            max_movies: None,
        }
    }
}
