//! The pieces a query is assembled from

use cypherlink_core::Value;
use std::collections::BTreeMap;
use strum_macros::Display;

/// A node in a pattern, e.g. `(n:Person {name: 'Ada'})`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

impl NodePattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Which way a relationship points, relative to the node before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// `-[]->`
    #[default]
    Outgoing,
    /// `<-[]-`
    Incoming,
    /// `-[]-`
    Undirected,
}

/// A relationship in a pattern, e.g. `-[r:KNOWS {since: 2020}]->`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_type: Option<String>,
    pub direction: Direction,
    pub properties: BTreeMap<String, Value>,
}

impl RelationshipPattern {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn rel_type(mut self, rel_type: impl Into<String>) -> Self {
        self.rel_type = Some(rel_type.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Comparison operators usable in `WHERE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operator {
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<>")]
    Ne,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "IN")]
    In,
    #[strum(serialize = "STARTS WITH")]
    StartsWith,
    #[strum(serialize = "ENDS WITH")]
    EndsWith,
    #[strum(serialize = "CONTAINS")]
    Contains,
    #[strum(serialize = "=~")]
    RegexMatch,
}

/// How a filter joins the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Connective {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `item op literal`
    Value {
        item: String,
        op: Operator,
        value: Value,
    },
    /// `item op other_item`
    Property {
        item: String,
        op: Operator,
        other: String,
    },
    /// `item IS NULL` or `item IS NOT NULL`
    Null { item: String, is_null: bool },
    /// `variable:Label`
    Label { variable: String, label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnItem {
    /// `*`
    All,
    Item { item: String, alias: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum PatternKeyword {
    #[strum(serialize = "MATCH")]
    Match,
    #[strum(serialize = "OPTIONAL MATCH")]
    OptionalMatch,
    #[strum(serialize = "CREATE")]
    Create,
    #[strum(serialize = "MERGE")]
    Merge,
}

impl PatternKeyword {
    pub(crate) fn allows_filter(self) -> bool {
        matches!(self, PatternKeyword::Match | PatternKeyword::OptionalMatch)
    }

    pub(crate) fn writes(self) -> bool {
        matches!(self, PatternKeyword::Create | PatternKeyword::Merge)
    }
}

/// One step of a query, in call order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Clause {
    Keyword(PatternKeyword),
    Node(NodePattern),
    Relationship(RelationshipPattern),
    Filter {
        connective: Connective,
        negated: bool,
        predicate: Predicate,
    },
    Set(Vec<(String, Value)>),
    Delete {
        detach: bool,
        variables: Vec<String>,
    },
    Return(Vec<ReturnItem>),
    OrderBy(Vec<(String, Order)>),
    Skip(u64),
    Limit(u64),
}
