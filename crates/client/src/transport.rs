//! The seam between the facade and whatever actually speaks to the engine

use async_trait::async_trait;
use cypherlink_core::{Result, Row, Value};
use std::collections::BTreeMap;

/// Named query parameters, referenced as `$name` in statements
pub type Params = BTreeMap<String, Value>;

/// A channel that can submit Cypher statements to a graph engine
///
/// Implementations map unreachable or dropped connections to
/// [`Error::Connection`](cypherlink_core::Error::Connection) and engine
/// rejections to [`Error::Query`](cypherlink_core::Error::Query).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Runs a statement and discards any rows it produces
    async fn execute(&self, statement: &str, params: &Params) -> Result<()>;

    /// Runs a statement and returns a cursor over its rows
    async fn execute_and_fetch(&self, statement: &str, params: &Params)
        -> Result<Box<dyn RowCursor>>;

    /// Whether the transport still believes it can reach the engine
    fn is_active(&self) -> bool;
}

/// Pull-based access to the rows of one statement
#[async_trait]
pub trait RowCursor: Send {
    /// Next row, or `None` once the result is exhausted
    async fn next_row(&mut self) -> Result<Option<Row>>;
}
