//! Path module - alternating node/relationship sequences

use serde::{Deserialize, Serialize};

use crate::{DomainError, Node, Relationship};

/// One element of a path, in traversal order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEntity<'a> {
    /// A node
    Node(&'a Node),
    /// A relationship
    Relationship(&'a Relationship),
}

/// A path through the graph
///
/// Holds `n + 1` nodes and `n` relationships; relationship `i` joins
/// node `i` and node `i + 1` in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPath")]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

/// Unchecked wire form of [`Path`]
#[derive(Deserialize)]
struct RawPath {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

impl TryFrom<RawPath> for Path {
    type Error = DomainError;

    fn try_from(raw: RawPath) -> Result<Self, Self::Error> {
        Path::new(raw.nodes, raw.relationships)
    }
}

impl Path {
    /// A zero-length path holding one node
    pub fn single(node: Node) -> Self {
        Self {
            nodes: vec![node],
            relationships: Vec::new(),
        }
    }

    /// Build a path, validating that nodes and relationships alternate
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> Result<Self, DomainError> {
        if nodes.is_empty() {
            return Err(DomainError::InvalidPath("a path needs at least one node".to_string()));
        }
        if nodes.len() != relationships.len() + 1 {
            return Err(DomainError::InvalidPath(format!(
                "{} nodes cannot be joined by {} relationships",
                nodes.len(),
                relationships.len()
            )));
        }
        for (i, rel) in relationships.iter().enumerate() {
            if !rel.connects(nodes[i].id, nodes[i + 1].id) {
                return Err(DomainError::InvalidPath(format!(
                    "relationship {} does not join nodes {} and {}",
                    rel.id,
                    nodes[i].id,
                    nodes[i + 1].id
                )));
            }
        }
        Ok(Self { nodes, relationships })
    }

    /// Extend the path by one hop from its end node
    pub fn append(&mut self, relationship: Relationship, node: Node) -> Result<(), DomainError> {
        let end = self.end_node().id;
        if !relationship.connects(end, node.id) {
            return Err(DomainError::InvalidPath(format!(
                "relationship {} does not join nodes {} and {}",
                relationship.id, end, node.id
            )));
        }
        self.relationships.push(relationship);
        self.nodes.push(node);
        Ok(())
    }

    /// First node
    pub fn start_node(&self) -> &Node {
        &self.nodes[0]
    }

    /// Last node
    pub fn end_node(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Number of relationships
    pub fn length(&self) -> usize {
        self.relationships.len()
    }

    /// Nodes in traversal order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Relationships in traversal order
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Nodes and relationships interleaved, starting and ending with a node
    pub fn entities(&self) -> impl Iterator<Item = PathEntity<'_>> {
        let rels = self.relationships.iter().map(PathEntity::Relationship);
        let mut nodes = self.nodes.iter().map(PathEntity::Node);
        let first = nodes.next();
        first.into_iter().chain(rels.zip(nodes).flat_map(|(r, n)| [r, n]))
    }
}
