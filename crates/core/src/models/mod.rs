//! Graph objects and schema definitions
//!
//! Nodes, relationships and paths are what the engine hands back in result rows.
//! Indexes, constraints, streams and triggers know how to render the DDL that
//! creates or drops them.

mod admin;
mod node;
mod path;
mod relationship;
mod schema;
mod streams;

pub use admin::{Procedure, StorageMode, TerminatedTransaction, Transaction};
pub use node::Node;
pub use path::{Path, PathElement};
pub use relationship::Relationship;
pub use schema::{Constraint, Index};
pub use streams::{
    KafkaStream, PulsarStream, Stream, Trigger, TriggerEventObject, TriggerEventType,
    TriggerExecutionPhase,
};

use crate::cypher::escape_identifier;
use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::BTreeMap;

/// Renders `variable.key = literal` for every non-null property
pub(crate) fn property_assignments(
    variable: &str,
    properties: &BTreeMap<String, Value>,
) -> Result<Vec<String>> {
    let variable = escape_identifier(variable)?;
    properties
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let key = escape_identifier(key)
                .map_err(|e| Error::invalid_value(format!("property key: {e}")))?;
            Ok(format!("{variable}.{key} = {}", value.to_cypher()?))
        })
        .collect()
}
