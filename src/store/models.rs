//! Result types shared by every store client

use serde::{Deserialize, Serialize};

/// Tabular result of one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Tabular result rows
    pub records: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows with by-name column access
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }
}

/// A borrowed view of one result row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [serde_json::Value],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a serde_json::Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn get_str(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(|v| v.as_f64())
    }
}

/// Node and relationship counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub nodes: u64,
    pub edges: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_access_by_name() {
        let result = QueryResult {
            columns: vec!["name".into(), "score".into()],
            records: vec![vec![json!("Hereditary"), json!(90.0)]],
        };
        assert_eq!(result.len(), 1);
        let row = result.rows().next().unwrap();
        assert_eq!(row.get_str("name"), Some("Hereditary"));
        assert_eq!(row.get_f64("score"), Some(90.0));
        assert!(row.get("year").is_none());
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult::new(vec!["name".into()]);
        assert!(result.is_empty());
        assert_eq!(result.rows().count(), 0);
    }
}
