//! Fluent builder for Cypher read and write queries
//!
//! ```
//! use cypherlink_query::{Operator, QueryBuilder};
//!
//! let query = QueryBuilder::match_()
//!     .node("Person", "p")
//!     .where_("p.name", Operator::Eq, "Ada")
//!     .render()
//!     .unwrap();
//! assert_eq!(query, "MATCH (p:Person) WHERE p.name = 'Ada' RETURN p");
//! ```

#![deny(warnings)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod builder;
mod clause;
mod render;

pub use builder::QueryBuilder;
pub use clause::{
    Connective, Direction, NodePattern, Operator, Order, Predicate, RelationshipPattern,
    ReturnItem,
};
pub use cypherlink_core::BuilderError;
