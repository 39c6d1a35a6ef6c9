//! Trait definitions for external interactions
//!
//! These traits define the boundary between the conversion logic and graph
//! storage. Storage implementations live in other crates.

use std::collections::BTreeMap;

use crate::{Node, NodeId, Path, Properties, RelId, Relationship, Value};

/// Direction of relationships relative to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Relationships starting at the node
    Outgoing,
    /// Relationships ending at the node
    Incoming,
    /// Both
    #[default]
    Both,
}

impl Direction {
    /// Whether `rel` leaves or enters `node` according to this direction
    pub fn matches(&self, rel: &Relationship, node: NodeId) -> bool {
        match self {
            Direction::Outgoing => rel.start == node,
            Direction::Incoming => rel.end == node,
            Direction::Both => rel.start == node || rel.end == node,
        }
    }
}

/// Variable-length expansion criteria, as in `(a)-[:TYPE*min..max]->(b)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandSpec {
    /// Only follow relationships of this type
    pub rel_type: Option<String>,

    /// Direction to follow
    pub direction: Direction,

    /// Minimum number of hops for a path to be reported
    pub min_depth: usize,

    /// Maximum number of hops (`None` = unbounded)
    pub max_depth: Option<usize>,
}

impl Default for ExpandSpec {
    fn default() -> Self {
        Self {
            rel_type: None,
            direction: Direction::Both,
            min_depth: 1,
            max_depth: None,
        }
    }
}

impl ExpandSpec {
    /// Outgoing expansion over any type
    pub fn outgoing() -> Self {
        Self {
            direction: Direction::Outgoing,
            ..Self::default()
        }
    }

    /// Restrict to one relationship type (builder pattern)
    #[must_use]
    pub fn with_type(mut self, rel_type: impl Into<String>) -> Self {
        self.rel_type = Some(rel_type.into());
        self
    }

    /// Set the direction (builder pattern)
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the depth bounds (builder pattern)
    #[must_use]
    pub fn with_depth(mut self, min_depth: usize, max_depth: Option<usize>) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// Whether a path of `depth` hops is reported
    pub fn accepts(&self, depth: usize) -> bool {
        depth >= self.min_depth && self.max_depth.map_or(true, |max| depth <= max)
    }

    /// Whether expansion may continue past `depth` hops
    pub fn can_extend(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

/// Trait for reading and writing a property graph
///
/// Implemented by the infrastructure layer (trellis-store)
pub trait GraphStore {
    /// Error type for store operations
    type Error;

    /// Create a node
    fn create_node(&mut self, labels: &[&str], properties: Properties) -> Result<Node, Self::Error>;

    /// Create a relationship between two existing nodes
    fn create_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        properties: Properties,
    ) -> Result<Relationship, Self::Error>;

    /// Get a node by id
    fn node(&self, id: NodeId) -> Result<Option<Node>, Self::Error>;

    /// Get a relationship by id
    fn relationship(&self, id: RelId) -> Result<Option<Relationship>, Self::Error>;

    /// All nodes carrying a label, in id order
    fn nodes_with_label(&self, label: &str) -> Result<Vec<Node>, Self::Error>;

    /// Set (or with `Value::Null`, remove) a node property
    fn set_node_property(&mut self, id: NodeId, key: &str, value: Value) -> Result<Node, Self::Error>;

    /// Relationships attached to a node, in id order
    fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>, Self::Error>;

    /// Delete a relationship
    fn delete_relationship(&mut self, id: RelId) -> Result<(), Self::Error>;

    /// Replace a relationship by one of `new_type` with the same endpoints
    /// and properties
    ///
    /// Either both the creation and the deletion happen or neither does.
    fn replace_relationship_type(&mut self, id: RelId, new_type: &str) -> Result<Relationship, Self::Error>;

    /// Delete a node together with its relationships
    fn detach_delete_node(&mut self, id: NodeId) -> Result<(), Self::Error>;

    /// Variable-length expansion from a start node
    ///
    /// Paths never reuse a relationship and are returned in depth-first
    /// discovery order.
    fn expand(&self, start: NodeId, spec: &ExpandSpec) -> Result<Vec<Path>, Self::Error>;
}

/// Trait for looking up nodes by id
///
/// Used when a relationship is serialized on its own and its endpoints
/// must be resolved.
pub trait NodeResolver {
    /// Resolve a node, `None` if unknown
    fn resolve_node(&self, id: NodeId) -> Option<Node>;
}

impl NodeResolver for BTreeMap<NodeId, Node> {
    fn resolve_node(&self, id: NodeId) -> Option<Node> {
        self.get(&id).cloned()
    }
}
