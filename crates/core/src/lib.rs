//! Core types for the cypherlink Memgraph client
//!
//! This crate holds everything that does not need a live connection:
//!
//! - **Values**: the [`Value`] model for parameters and result cells
//! - **Graph objects**: nodes, relationships and paths returned by queries
//! - **Schema**: indexes, constraints, streams and triggers with their DDL
//! - **Configuration**: layered connection settings
//! - **Error handling**: unified error types
//!

#![deny(warnings)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod cypher;
pub mod error;
pub mod models;
pub mod row;
pub mod value;

// Re-export main types for convenience
pub use config::{Config, ConnectionConfig};
pub use error::{BuilderError, Error, Result, ResultExt};
pub use models::{
    Constraint, Index, KafkaStream, Node, Path, PathElement, Procedure, PulsarStream,
    Relationship, StorageMode, Stream, TerminatedTransaction, Transaction, Trigger, TriggerEventObject,
    TriggerEventType, TriggerExecutionPhase,
};
pub use row::Row;
pub use value::Value;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::row::Row;
    pub use crate::value::Value;
}
