//! Raw attribute bag -> canonical movie

use super::record::{CanonicalMovie, RawMovie};
use crate::error::ValidationError;

/// Turns scraped attribute bags into [`CanonicalMovie`]s.
///
/// Rules:
/// - year: parentheses removed, `"(2019)"` -> `"2019"`
/// - genre, box office, runtime: every whitespace character removed
/// - score: trailing `%` and surrounding whitespace removed, parsed as `f64`
/// - name, year, genre, director and score are required; blank counts as absent
/// - absent optional fields stay `None`
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieNormalizer;

impl MovieNormalizer {
    pub fn normalize(raw: &RawMovie) -> Result<CanonicalMovie, ValidationError> {
        let name = required("name", raw.name.as_deref().map(str::trim))?;
        let year = required("year", raw.year_parenthesized.as_deref().map(strip_parens))?;
        let genre = required("genre", raw.genre_raw.as_deref().map(strip_whitespace))?;
        let director = required("director", raw.director_name.as_deref().map(str::trim))?;
        let score = required(
            "reviewScore",
            raw.review_score_percent_string.as_deref().map(str::trim),
        )?;

        Ok(CanonicalMovie {
            name,
            year,
            genre,
            director,
            release_date: raw
                .release_date
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            box_office: raw.box_office_raw.as_deref().map(strip_whitespace),
            runtime: raw.runtime_raw.as_deref().map(strip_whitespace),
            review_score: parse_score(&score)?,
            watch_providers: raw
                .watch_provider_image_list
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

impl TryFrom<&RawMovie> for CanonicalMovie {
    type Error = ValidationError;

    fn try_from(raw: &RawMovie) -> Result<Self, Self::Error> {
        MovieNormalizer::normalize(raw)
    }
}

fn required<S: Into<String>>(field: &'static str, value: Option<S>) -> Result<String, ValidationError> {
    value
        .map(Into::into)
        .filter(|s: &String| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn strip_parens(s: &str) -> String {
    s.chars().filter(|c| *c != '(' && *c != ')').collect::<String>().trim().to_string()
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `" 87% "` -> `87.0`
pub fn parse_score(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let score: f64 = number
        .parse()
        .map_err(|_| ValidationError::InvalidScore(text.to_string()))?;
    if !score.is_finite() {
        return Err(ValidationError::InvalidScore(text.to_string()));
    }
    if !(0.0..=100.0).contains(&score) {
        return Err(ValidationError::ScoreOutOfRange(score));
    }
    Ok(score)
}
