use crate::cypher::escape_identifier;
use crate::error::Result;
use serde::Serialize;

/// A label or label-property index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Index {
    pub label: String,
    pub property: Option<String>,
}

impl Index {
    /// Index on all nodes carrying `label`
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: None,
        }
    }

    /// Index on `property` of nodes carrying `label`
    pub fn label_property(label: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: Some(property.into()),
        }
    }

    /// `:Label` or `:Label(property)`
    pub fn to_cypher(&self) -> Result<String> {
        let label = escape_identifier(&self.label)?;
        match &self.property {
            Some(property) => Ok(format!(":{label}({})", escape_identifier(property)?)),
            None => Ok(format!(":{label}")),
        }
    }

    pub fn create_statement(&self) -> Result<String> {
        Ok(format!("CREATE INDEX ON {};", self.to_cypher()?))
    }

    pub fn drop_statement(&self) -> Result<String> {
        Ok(format!("DROP INDEX ON {};", self.to_cypher()?))
    }
}

/// A uniqueness or existence constraint on node properties
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Constraint {
    Unique {
        label: String,
        properties: Vec<String>,
    },
    Exists {
        label: String,
        property: String,
    },
}

impl Constraint {
    pub fn unique<I, S>(label: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Unique {
            label: label.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exists(label: impl Into<String>, property: impl Into<String>) -> Self {
        Constraint::Exists {
            label: label.into(),
            property: property.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Constraint::Unique { label, .. } | Constraint::Exists { label, .. } => label,
        }
    }

    /// `(n:Label) ASSERT ...` body shared by create and drop statements
    pub fn to_cypher(&self) -> Result<String> {
        let label = escape_identifier(self.label())?;
        match self {
            Constraint::Unique { properties, .. } => {
                let properties = properties
                    .iter()
                    .map(|p| Ok(format!("n.{}", escape_identifier(p)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!(
                    "(n:{label}) ASSERT {} IS UNIQUE",
                    properties.join(", ")
                ))
            }
            Constraint::Exists { property, .. } => Ok(format!(
                "(n:{label}) ASSERT EXISTS (n.{})",
                escape_identifier(property)?
            )),
        }
    }

    pub fn create_statement(&self) -> Result<String> {
        Ok(format!("CREATE CONSTRAINT ON {};", self.to_cypher()?))
    }

    pub fn drop_statement(&self) -> Result<String> {
        Ok(format!("DROP CONSTRAINT ON {};", self.to_cypher()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_statements() {
        assert_eq!(
            Index::label("Person").create_statement().unwrap(),
            "CREATE INDEX ON :Person;"
        );
        assert_eq!(
            Index::label_property("Person", "name")
                .drop_statement()
                .unwrap(),
            "DROP INDEX ON :Person(name);"
        );
    }

    #[test]
    fn test_unique_constraint_multiple_properties() {
        let constraint = Constraint::unique("Person", ["first", "last"]);
        assert_eq!(
            constraint.create_statement().unwrap(),
            "CREATE CONSTRAINT ON (n:Person) ASSERT n.first, n.last IS UNIQUE;"
        );
    }

    #[test]
    fn test_exists_constraint() {
        let constraint = Constraint::exists("Person", "name");
        assert_eq!(
            constraint.drop_statement().unwrap(),
            "DROP CONSTRAINT ON (n:Person) ASSERT EXISTS (n.name);"
        );
    }

    #[test]
    fn test_empty_label_is_rejected() {
        assert!(Index::label("").to_cypher().is_err());
    }
}
