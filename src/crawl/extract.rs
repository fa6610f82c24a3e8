//! HTML extraction for the catalog page and movie detail pages

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::CrawlError;
use crate::movie::RawMovie;

const CATALOG_ROW: &str = "div.article_movie_title";
const CATALOG_LINK: &str = "div > h2 > a";
const CATALOG_SCORE: &str = "div > h2 > span.tMeterScore";
const CATALOG_YEAR: &str = "div > h2 > span.subtle.start-year";

const MOVIE_NAME: &str = "div.thumbnail-scoreboard-wrap > score-board-deprecated > h1";
const MOVIE_GENRE: &str = "ul#info > li:nth-child(2) > p > span";
const MOVIE_DIRECTOR: &str = "ul#info > li:nth-child(4) > p > span > a";
const MOVIE_RELEASE_DATE: &str = "ul#info > li:nth-child(7) > p > span > time";
const MOVIE_BOX_OFFICE: &str = "ul#info > li:nth-child(10) > p > span";
const MOVIE_RUNTIME: &str = "ul#info > li:nth-child(11) > p > span > time";
const MOVIE_WATCH: &str = "section.where-to-watch where-to-watch-bubble";

/// One row of the catalog: where the detail page is, plus the two fields
/// only the catalog shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub url: Url,
    pub score: Option<String>,
    pub year: Option<String>,
}

/// Compiled selectors for both page kinds
#[derive(Debug)]
pub struct Selectors {
    row: Selector,
    link: Selector,
    score: Selector,
    year: Selector,
    name: Selector,
    genre: Selector,
    director: Selector,
    release_date: Selector,
    box_office: Selector,
    runtime: Selector,
    watch: Selector,
}

fn compile(selector: &'static str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector,
        message: e.to_string(),
    })
}

/// First text node of the first match; `None` if nothing matches
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.text().next())
        .map(str::to_string)
}

impl Selectors {
    pub fn new() -> Result<Self, CrawlError> {
        Ok(Self {
            row: compile(CATALOG_ROW)?,
            link: compile(CATALOG_LINK)?,
            score: compile(CATALOG_SCORE)?,
            year: compile(CATALOG_YEAR)?,
            name: compile(MOVIE_NAME)?,
            genre: compile(MOVIE_GENRE)?,
            director: compile(MOVIE_DIRECTOR)?,
            release_date: compile(MOVIE_RELEASE_DATE)?,
            box_office: compile(MOVIE_BOX_OFFICE)?,
            runtime: compile(MOVIE_RUNTIME)?,
            watch: compile(MOVIE_WATCH)?,
        })
    }

    /// Catalog rows in page order. Rows without a usable link come back as
    /// errors so the caller can report and skip them.
    pub fn parse_catalog(&self, html: &str, base: &Url) -> Vec<Result<CatalogEntry, CrawlError>> {
        let doc = Html::parse_document(html);
        doc.select(&self.row)
            .map(|row| -> Result<CatalogEntry, CrawlError> {
                let href = row
                    .select(&self.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| CrawlError::MissingCatalogField {
                        url: base.to_string(),
                        field: "href",
                    })?;
                Ok(CatalogEntry {
                    url: base.join(href)?,
                    score: first_text(row, &self.score),
                    year: first_text(row, &self.year),
                })
            })
            .collect()
    }

    /// Extract a detail page into a raw record, filling in the catalog fields
    pub fn parse_movie(&self, html: &str, entry: &CatalogEntry) -> RawMovie {
        let doc = Html::parse_document(html);
        let root = doc.root_element();
        RawMovie {
            name: first_text(root, &self.name),
            review_score_percent_string: entry.score.clone(),
            year_parenthesized: entry.year.clone(),
            genre_raw: first_text(root, &self.genre),
            director_name: first_text(root, &self.director),
            release_date: first_text(root, &self.release_date),
            box_office_raw: first_text(root, &self.box_office),
            runtime_raw: first_text(root, &self.runtime),
            watch_provider_image_list: root
                .select(&self.watch)
                .filter_map(|el| el.value().attr("image"))
                .map(str::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        <html><body>
          <div class="article_movie_title">
            <div><h2>
              <a href="/m/the_exorcist">The Exorcist</a>
              <span class="subtle start-year">(1973)</span>
              <span class="tMeterScore">78%</span>
            </h2></div>
          </div>
          <div class="article_movie_title">
            <div><h2>
              <a href="https://www.rottentomatoes.com/m/get_out">Get Out</a>
              <span class="subtle start-year">(2017)</span>
              <span class="tMeterScore">98%</span>
            </h2></div>
          </div>
          <div class="article_movie_title">
            <div><h2><span class="tMeterScore">50%</span></h2></div>
          </div>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <div class="thumbnail-scoreboard-wrap">
            <score-board-deprecated><h1>
              The Exorcist
            </h1></score-board-deprecated>
          </div>
          <ul id="info">
            <li><p>Rating</p></li>
            <li><p><b>Genre:</b> <span>
                Horror
            </span></p></li>
            <li><p>Language</p></li>
            <li><p><b>Director:</b> <span><a href="/celebrity/william_friedkin">William Friedkin</a></span></p></li>
            <li><p>Producer</p></li>
            <li><p>Writer</p></li>
            <li><p><b>Release Date:</b> <span><time>Dec 26, 1973</time></span></p></li>
            <li><p>Streaming</p></li>
            <li><p>Rerelease</p></li>
            <li><p><b>Box Office:</b> <span>
                $230.9M
            </span></p></li>
          </ul>
          <section class="where-to-watch">
            <bubbles-overflow-container>
              <where-to-watch-meta>
                <where-to-watch-bubble image="hbo-max"></where-to-watch-bubble>
                <where-to-watch-bubble image="amazon-prime-video-us"></where-to-watch-bubble>
              </where-to-watch-meta>
            </bubbles-overflow-container>
          </section>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://editorial.rottentomatoes.com/guide/best-horror-movies-of-all-time/").unwrap()
    }

    #[test]
    fn test_parse_catalog_rows() {
        let selectors = Selectors::new().unwrap();
        let rows = selectors.parse_catalog(CATALOG, &base());
        assert_eq!(rows.len(), 3);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.url.as_str(), "https://editorial.rottentomatoes.com/m/the_exorcist");
        assert_eq!(first.year.as_deref(), Some("(1973)"));
        assert_eq!(first.score.as_deref(), Some("78%"));

        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.url.as_str(), "https://www.rottentomatoes.com/m/get_out");

        assert!(matches!(
            rows[2],
            Err(CrawlError::MissingCatalogField { field: "href", .. })
        ));
    }

    #[test]
    fn test_parse_movie_page() {
        let selectors = Selectors::new().unwrap();
        let entry = CatalogEntry {
            url: base().join("/m/the_exorcist").unwrap(),
            score: Some("78%".into()),
            year: Some("(1973)".into()),
        };
        let raw = selectors.parse_movie(DETAIL, &entry);

        assert_eq!(raw.name.as_deref().map(str::trim), Some("The Exorcist"));
        assert_eq!(raw.genre_raw.as_deref().map(str::trim), Some("Horror"));
        assert_eq!(raw.director_name.as_deref(), Some("William Friedkin"));
        assert_eq!(raw.release_date.as_deref(), Some("Dec 26, 1973"));
        assert_eq!(raw.box_office_raw.as_deref().map(str::trim), Some("$230.9M"));
        assert_eq!(raw.runtime_raw, None, "no 11th info item");
        assert_eq!(raw.review_score_percent_string.as_deref(), Some("78%"));
        assert_eq!(raw.watch_provider_image_list, vec!["hbo-max", "amazon-prime-video-us"]);
    }

    #[test]
    fn test_parse_movie_page_missing_everything() {
        let selectors = Selectors::new().unwrap();
        let entry = CatalogEntry { url: base(), score: None, year: None };
        let raw = selectors.parse_movie("<html><body></body></html>", &entry);
        assert_eq!(raw, RawMovie::default());
    }
}
