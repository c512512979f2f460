use crate::cypher::escape_identifier;
use crate::error::Result;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

use super::property_assignments;

/// A directed, typed edge between two persisted nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    /// Engine-internal id, set once the relationship has been persisted or loaded
    pub id: Option<i64>,
    pub rel_type: String,
    pub start_node_id: i64,
    pub end_node_id: i64,
    pub properties: BTreeMap<String, Value>,
}

impl Relationship {
    pub fn new(rel_type: impl Into<String>, start_node_id: i64, end_node_id: i64) -> Self {
        Self {
            id: None,
            rel_type: rel_type.into(),
            start_node_id,
            end_node_id,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The relationship type as a Cypher type expression, e.g. `:FRIENDS_WITH`
    pub fn type_cypher(&self) -> Result<String> {
        Ok(format!(":{}", escape_identifier(&self.rel_type)?))
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

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.rel_type)?;
        if let Some(id) = self.id {
            write!(f, " id={id}")?;
        }
        write!(
            f,
            " start_node_id={} end_node_id={} properties={:?}>",
            self.start_node_id, self.end_node_id, self.properties
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_clauses_skip_nulls() {
        let relationship = Relationship::new("KNOWS", 1, 2)
            .with_property("since", 2020)
            .with_property("note", Value::Null)
            .with_property("weight", 0.5);
        assert_eq!(relationship.type_cypher().unwrap(), ":KNOWS");
        assert_eq!(
            relationship.set_properties_cypher("r").unwrap().as_deref(),
            Some("SET r.since = 2020, r.weight = 0.5")
        );
        assert_eq!(
            relationship
                .properties_predicate_cypher("r", "AND")
                .unwrap()
                .as_deref(),
            Some("r.since = 2020 AND r.weight = 0.5")
        );
        assert_eq!(
            Relationship::new("KNOWS", 1, 2)
                .properties_predicate_cypher("r", "AND")
                .unwrap(),
            None
        );
    }
}
