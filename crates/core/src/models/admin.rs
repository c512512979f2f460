use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Storage engine mode of a Memgraph instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageMode {
    InMemoryTransactional,
    InMemoryAnalytical,
    OnDiskTransactional,
}

/// A transaction currently running on the server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub username: String,
    pub transaction_id: String,
    pub query: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
}

/// Outcome of asking the server to terminate a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminatedTransaction {
    pub transaction_id: String,
    pub killed: bool,
}

/// A query procedure loaded on the server, as listed by `mg.procedures()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    /// Fully qualified name, `module.procedure`
    pub name: String,
    pub signature: String,
    pub is_write: bool,
    pub path: Option<String>,
    pub is_editable: Option<bool>,
}

impl Procedure {
    /// The module part of the name
    pub fn module(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(module, _)| module)
    }
}
