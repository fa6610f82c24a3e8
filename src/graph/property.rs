//! Property values stored on nodes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property value. Movies only ever carry strings, a float score, or an
/// explicit null (absent runtime / box office).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Float(f64),
    Integer(i64),
    Null,
}

/// Properties keyed by name, in insertion order.
pub type PropertyMap = IndexMap<String, PropertyValue>;

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
            PropertyValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_maps_to_null() {
        let absent: Option<String> = None;
        assert!(PropertyValue::from(absent).is_null());
        assert_eq!(
            PropertyValue::from(Some("1h 32m")).as_string(),
            Some("1h 32m")
        );
    }

    #[test]
    fn test_to_json() {
        assert_eq!(PropertyValue::from(87.0).to_json(), serde_json::json!(87.0));
        assert_eq!(PropertyValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(PropertyValue::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(PropertyValue::from(3i64).as_float(), Some(3.0));
    }
}
