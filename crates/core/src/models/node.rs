use crate::cypher::escape_identifier;
use crate::error::Result;
use crate::value::Value;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::property_assignments;

/// A node as stored in, or loaded from, the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    /// Engine-internal id, set once the node has been persisted or loaded
    pub id: Option<i64>,
    pub labels: BTreeSet<String>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    /// Creates an unsaved node with a single label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            labels: BTreeSet::from([label.into()]),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Labels as a Cypher label expression, e.g. `:Person:User`
    pub fn labels_cypher(&self) -> Result<String> {
        self.labels
            .iter()
            .map(|label| Ok(format!(":{}", escape_identifier(label)?)))
            .collect()
    }

    /// `SET` clause writing every non-null property, or `None` if there is nothing to set
    pub fn set_properties_cypher(&self, variable: &str) -> Result<Option<String>> {
        let assignments = property_assignments(variable, &self.properties)?;
        if assignments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!("SET {}", assignments.join(", "))))
        }
    }

    /// Predicate matching every non-null property, joined with `connective`
    pub fn properties_predicate_cypher(
        &self,
        variable: &str,
        connective: &str,
    ) -> Result<Option<String>> {
        let assignments = property_assignments(variable, &self.properties)?;
        if assignments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(assignments.join(&format!(" {connective} "))))
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        write!(f, "<Node labels={}", labels.join(":"))?;
        if let Some(id) = self.id {
            write!(f, " id={id}")?;
        }
        write!(f, " properties={:?}>", self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_cypher_is_sorted_and_escaped() {
        let node = Node::new("User").with_label("Person").with_label("Has Space");
        assert_eq!(node.labels_cypher().unwrap(), ":`Has Space`:Person:User");
    }

    #[test]
    fn test_set_properties_skips_nulls() {
        let node = Node::new("Person")
            .with_property("name", "Alice")
            .with_property("age", 34)
            .with_property("nickname", Value::Null);
        assert_eq!(
            node.set_properties_cypher("node").unwrap().as_deref(),
            Some("SET node.age = 34, node.name = 'Alice'")
        );
    }

    #[test]
    fn test_set_properties_empty() {
        assert_eq!(Node::new("Person").set_properties_cypher("n").unwrap(), None);
    }

    #[test]
    fn test_properties_predicate() {
        let node = Node::new("Person")
            .with_property("name", "Alice")
            .with_property("age", 34);
        assert_eq!(
            node.properties_predicate_cypher("n", "AND").unwrap().as_deref(),
            Some("n.age = 34 AND n.name = 'Alice'")
        );
    }
}
