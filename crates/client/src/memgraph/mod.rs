//! Memgraph-specific administration on top of a [`Connection`]
//!
//! Covers schema (indexes and constraints), streams, triggers, storage mode,
//! transaction management and saving/loading graph objects.

mod admin;
mod objects;
mod schema;
mod streams;

use cypherlink_core::{ConnectionConfig, Error, Result, Row, Value};
use tracing::info;

use crate::connection::Connection;
use crate::results::ResultStream;

/// Client for a Memgraph instance
#[derive(Debug)]
pub struct MemgraphClient {
    connection: Connection,
}

impl MemgraphClient {
    /// Connect with a Bolt transport
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        Ok(Self::new(Connection::connect(config).await?))
    }

    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn into_connection(self) -> Connection {
        self.connection
    }

    pub async fn execute(&self, statement: &str) -> Result<()> {
        self.connection.execute_query(statement).await
    }

    pub async fn execute_and_fetch(&self, statement: &str) -> Result<ResultStream> {
        self.connection.execute_and_fetch(statement).await
    }

    /// Delete every node and relationship
    pub async fn drop_database(&self) -> Result<()> {
        info!("Dropping all nodes and relationships");
        self.execute("MATCH (n) DETACH DELETE n;").await
    }

    async fn fetch_all(&self, statement: &str) -> Result<Vec<Row>> {
        self.execute_and_fetch(statement).await?.collect_rows().await
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| Error::conversion(format!("missing column '{name}'")))
}

fn string_column(row: &Row, name: &str) -> Result<String> {
    match column(row, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::conversion(format!(
            "column '{name}' should be a string, got {}",
            other.type_name()
        ))),
    }
}

fn string_list(value: &Value, name: &str) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::List(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::conversion(format!("column '{name}' should hold strings"))
                })
            })
            .collect(),
        other => Err(Error::conversion(format!(
            "column '{name}' should be a list of strings, got {}",
            other.type_name()
        ))),
    }
}
