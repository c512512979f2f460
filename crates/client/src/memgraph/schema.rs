use cypherlink_core::{Constraint, Error, Index, Result, Value};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::{column, string_column, string_list, MemgraphClient};

const CONSTRAINT_TYPE: &str = "constraint type";
const LABEL: &str = "label";
const PROPERTY: &str = "property";
const PROPERTIES: &str = "properties";

impl MemgraphClient {
    /// All label and label-property indexes
    pub async fn get_indexes(&self) -> Result<Vec<Index>> {
        self.fetch_all("SHOW INDEX INFO;")
            .await?
            .iter()
            .map(|row| {
                let label = string_column(row, LABEL)?;
                let property = match row.get(PROPERTY) {
                    None | Some(Value::Null) => None,
                    Some(value) => {
                        let mut properties = string_list(value, PROPERTY)?;
                        if properties.len() > 1 {
                            return Err(Error::conversion(format!(
                                "composite index on :{label} is not supported"
                            )));
                        }
                        properties.pop()
                    }
                };
                Ok(Index { label, property })
            })
            .collect()
    }

    pub async fn create_index(&self, index: &Index) -> Result<()> {
        self.execute(&index.create_statement()?).await
    }

    pub async fn drop_index(&self, index: &Index) -> Result<()> {
        self.execute(&index.drop_statement()?).await
    }

    /// Drop indexes not in `indexes` and create the missing ones
    pub async fn ensure_indexes(&self, indexes: &[Index]) -> Result<()> {
        let existing: BTreeSet<Index> = self.get_indexes().await?.into_iter().collect();
        let wanted: BTreeSet<Index> = indexes.iter().cloned().collect();

        for obsolete in existing.difference(&wanted) {
            info!("Dropping index {}", obsolete.to_cypher()?);
            self.drop_index(obsolete).await?;
        }
        for missing in wanted.difference(&existing) {
            info!("Creating index {}", missing.to_cypher()?);
            self.create_index(missing).await?;
        }
        Ok(())
    }

    /// All uniqueness and existence constraints
    ///
    /// Constraint kinds other than `unique` and `exists` are skipped.
    pub async fn get_constraints(&self) -> Result<Vec<Constraint>> {
        let mut constraints = Vec::new();
        for row in self.fetch_all("SHOW CONSTRAINT INFO;").await? {
            let kind = string_column(&row, CONSTRAINT_TYPE)?;
            let label = string_column(&row, LABEL)?;
            let properties = string_list(column(&row, PROPERTIES)?, PROPERTIES)?;
            match kind.as_str() {
                "unique" => constraints.push(Constraint::Unique { label, properties }),
                "exists" => {
                    let property = properties.into_iter().next().ok_or_else(|| {
                        Error::conversion(format!("exists constraint on :{label} has no property"))
                    })?;
                    constraints.push(Constraint::Exists { label, property });
                }
                other => debug!("Skipping {} constraint on :{}", other, label),
            }
        }
        Ok(constraints)
    }

    pub async fn get_unique_constraints(&self) -> Result<Vec<Constraint>> {
        Ok(self
            .get_constraints()
            .await?
            .into_iter()
            .filter(|c| matches!(c, Constraint::Unique { .. }))
            .collect())
    }

    pub async fn get_exists_constraints(&self) -> Result<Vec<Constraint>> {
        Ok(self
            .get_constraints()
            .await?
            .into_iter()
            .filter(|c| matches!(c, Constraint::Exists { .. }))
            .collect())
    }

    pub async fn create_constraint(&self, constraint: &Constraint) -> Result<()> {
        self.execute(&constraint.create_statement()?).await
    }

    pub async fn drop_constraint(&self, constraint: &Constraint) -> Result<()> {
        self.execute(&constraint.drop_statement()?).await
    }

    /// Drop constraints not in `constraints` and create the missing ones
    pub async fn ensure_constraints(&self, constraints: &[Constraint]) -> Result<()> {
        let existing: BTreeSet<Constraint> = self.get_constraints().await?.into_iter().collect();
        let wanted: BTreeSet<Constraint> = constraints.iter().cloned().collect();

        for obsolete in existing.difference(&wanted) {
            info!("Dropping constraint {}", obsolete.to_cypher()?);
            self.drop_constraint(obsolete).await?;
        }
        for missing in wanted.difference(&existing) {
            info!("Creating constraint {}", missing.to_cypher()?);
            self.create_constraint(missing).await?;
        }
        Ok(())
    }
}
