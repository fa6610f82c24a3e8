//! Graph nodes

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};

/// A labelled node with properties.
///
/// Every node in this system carries exactly one label; the key properties
/// that give it identity (`name`, plus `year` for movies) live alongside
/// the rest of its attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: Label,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<Label>, properties: PropertyMap) -> Self {
        Node {
            id,
            label: label.into(),
            properties,
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        &self.label == label
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// True when every `(key, value)` in `keys` is present with an equal value.
    pub fn matches(&self, keys: &PropertyMap) -> bool {
        keys.iter()
            .all(|(k, v)| self.properties.get(k).map_or(false, |own| own == v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_key_subset() {
        let mut props = PropertyMap::new();
        props.insert("name".into(), "Alien".into());
        props.insert("year".into(), "1979".into());
        props.insert("reviewScore".into(), 98.0.into());
        let node = Node::new(NodeId::new(1), "Movie", props);

        let mut keys = PropertyMap::new();
        keys.insert("name".into(), "Alien".into());
        keys.insert("year".into(), "1979".into());
        assert!(node.matches(&keys));

        keys.insert("year".into(), "1986".into());
        assert!(!node.matches(&keys));
        assert!(node.has_label(&Label::new("Movie")));
    }

    #[test]
    fn test_serialized_node_holds_only_identity_label_and_properties() {
        let node = Node::new(NodeId::new(7), "Genre", PropertyMap::new());
        let json = serde_json::to_value(&node).unwrap();
        let mut fields: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["id", "label", "properties"]);
    }
}
