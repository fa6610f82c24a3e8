//! Movie records before and after normalization

use serde::{Deserialize, Serialize};

/// Attribute bag for one movie as scraped, before any cleanup.
///
/// Field names serialize to the keys the crawler emits
/// (`yearParenthesized`, `boxOfficeRaw`, ...). Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMovie {
    pub name: Option<String>,
    /// e.g. `" 87% "`
    pub review_score_percent_string: Option<String>,
    /// e.g. `"(2019)"`
    pub year_parenthesized: Option<String>,
    pub genre_raw: Option<String>,
    pub director_name: Option<String>,
    pub release_date: Option<String>,
    pub box_office_raw: Option<String>,
    pub runtime_raw: Option<String>,
    pub watch_provider_image_list: Vec<String>,
}

/// A normalized movie, ready to be written to the graph.
///
/// Identity is `(name, year)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMovie {
    pub name: String,
    pub year: String,
    pub genre: String,
    pub director: String,
    pub release_date: Option<String>,
    pub box_office: Option<String>,
    /// `None` when the page lists no runtime; never `Some("null")`
    pub runtime: Option<String>,
    /// Percentage, 0..=100
    pub review_score: f64,
    pub watch_providers: Vec<String>,
}

impl CanonicalMovie {
    /// `name (year)`
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.year)
    }
}
