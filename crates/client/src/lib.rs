//! Connection facade for Memgraph and other Bolt-speaking graph databases
//!
//! [`Connection`] submits Cypher statements through a [`Transport`] and hands
//! back rows as a pull-based [`ResultStream`]. [`MemgraphClient`] layers
//! schema, stream, trigger and object management on top of a connection.

#![deny(warnings)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod connection;
mod memgraph;
pub mod mock;
mod neo4j;
mod results;
mod transport;

pub use connection::Connection;
pub use memgraph::MemgraphClient;
pub use mock::{ExecutedStatement, MockResponse, MockTransport};
pub use neo4j::Neo4jTransport;
pub use results::ResultStream;
pub use transport::{Params, RowCursor, Transport};
