use crate::error::{Error, Result};
use serde::Serialize;

use super::{Node, Relationship};

/// An alternating sequence of nodes and relationships
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

/// One step of a [`Path`] traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement<'a> {
    Node(&'a Node),
    Relationship(&'a Relationship),
}

impl Path {
    /// Builds a path; there must be exactly one more node than relationships
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Result<Self> {
        if nodes.len() != relationships.len() + 1 {
            return Err(Error::invalid_value(format!(
                "invalid path: {} nodes and {} relationships",
                nodes.len(),
                relationships.len()
            )));
        }
        Ok(Self {
            nodes,
            relationships,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Number of relationships in the path
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn end(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Walks the path from its start: node, relationship, node, ...
    pub fn traverse(&self) -> impl Iterator<Item = PathElement<'_>> {
        std::iter::once(PathElement::Node(&self.nodes[0])).chain(
            self.relationships
                .iter()
                .zip(self.nodes.iter().skip(1))
                .flat_map(|(rel, node)| [PathElement::Relationship(rel), PathElement::Node(node)]),
        )
    }
}
