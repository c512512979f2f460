//! Bolt transport backed by the neo4rs driver

mod convert;
mod transport;

pub use transport::Neo4jTransport;
