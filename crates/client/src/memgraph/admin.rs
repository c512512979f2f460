use cypherlink_core::cypher::quote_string;
use cypherlink_core::{
    Error, Procedure, Result, StorageMode, TerminatedTransaction, Transaction, Value,
};
use std::str::FromStr;
use tracing::info;

use super::{column, string_column, string_list, MemgraphClient};

impl MemgraphClient {
    pub async fn get_storage_mode(&self) -> Result<StorageMode> {
        for row in self.fetch_all("SHOW STORAGE INFO;").await? {
            if string_column(&row, "storage info")? == "storage_mode" {
                let mode = string_column(&row, "value")?;
                return StorageMode::from_str(&mode)
                    .map_err(|_| Error::conversion(format!("unknown storage mode '{mode}'")));
            }
        }
        Err(Error::not_found("storage_mode is not reported by SHOW STORAGE INFO"))
    }

    pub async fn set_storage_mode(&self, mode: StorageMode) -> Result<()> {
        info!("Switching storage mode to {}", mode);
        self.execute(&format!("STORAGE MODE {mode};")).await
    }

    pub async fn get_transactions(&self) -> Result<Vec<Transaction>> {
        self.fetch_all("SHOW TRANSACTIONS;")
            .await?
            .iter()
            .map(|row| {
                let metadata = match row.get("metadata") {
                    None | Some(Value::Null) => Default::default(),
                    Some(Value::Map(map)) => map.clone(),
                    Some(other) => {
                        return Err(Error::conversion(format!(
                            "transaction metadata should be a map, got {}",
                            other.type_name()
                        )))
                    }
                };
                Ok(Transaction {
                    username: string_column(row, "username")?,
                    transaction_id: string_column(row, "transaction_id")?,
                    query: string_list(column(row, "query")?, "query")?,
                    metadata,
                })
            })
            .collect()
    }

    /// Query procedures loaded on the server, optionally only those whose
    /// name starts with `starts_with`
    pub async fn get_procedures(&self, starts_with: Option<&str>) -> Result<Vec<Procedure>> {
        let mut procedures = Vec::new();
        for row in self.fetch_all("CALL mg.procedures() YIELD *;").await? {
            let name = string_column(&row, "name")?;
            if starts_with.is_some_and(|prefix| !name.starts_with(prefix)) {
                continue;
            }
            procedures.push(Procedure {
                name,
                signature: string_column(&row, "signature")?,
                is_write: row
                    .get("is_write")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                path: row.get("path").and_then(Value::as_str).map(str::to_string),
                is_editable: row.get("is_editable").and_then(Value::as_bool),
            });
        }
        Ok(procedures)
    }

    /// Ask the server to terminate the given transactions
    pub async fn terminate_transactions(
        &self,
        transaction_ids: &[String],
    ) -> Result<Vec<TerminatedTransaction>> {
        if transaction_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = transaction_ids.iter().map(|id| quote_string(id)).collect();
        let statement = format!("TERMINATE TRANSACTIONS {};", ids.join(", "));

        self.fetch_all(&statement)
            .await?
            .iter()
            .map(|row| {
                let killed = column(row, "killed")?.as_bool().ok_or_else(|| {
                    Error::conversion("column 'killed' should be a boolean")
                })?;
                Ok(TerminatedTransaction {
                    transaction_id: string_column(row, "transaction_id")?,
                    killed,
                })
            })
            .collect()
    }
}
