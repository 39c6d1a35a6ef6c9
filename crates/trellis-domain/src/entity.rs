//! Graph entities - nodes and relationships as immutable snapshots

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DomainError, Value};

/// Property map of a node or relationship
pub type Properties = BTreeMap<String, Value>;

/// Internal numeric identifier of a node
///
/// Numeric ids are assigned by the store and may be reused after deletion.
/// Use [`ElementId`] when a durable reference is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    /// Wrap a raw store id
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal numeric identifier of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelId(i64);

impl RelId {
    /// Wrap a raw store id
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of entity an element id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A node
    Node,
    /// A relationship
    Relationship,
}

impl EntityKind {
    fn tag(&self) -> u8 {
        match self {
            EntityKind::Node => 4,
            EntityKind::Relationship => 5,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "4" => Some(EntityKind::Node),
            "5" => Some(EntityKind::Relationship),
            _ => None,
        }
    }
}

/// Structured form of an element id: `<kind>:<database uuid>:<id>`
///
/// # Examples
///
/// ```
/// use trellis_domain::{ElementId, EntityKind};
///
/// let database = uuid::Uuid::now_v7();
/// let element_id = ElementId::new(EntityKind::Node, database, 42);
/// let parsed = ElementId::parse(&element_id.to_string()).unwrap();
/// assert_eq!(parsed, element_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    /// Entity kind
    pub kind: EntityKind,
    /// Database that owns the entity
    pub database: uuid::Uuid,
    /// Numeric id inside that database
    pub id: i64,
}

impl ElementId {
    /// Build an element id
    pub fn new(kind: EntityKind, database: uuid::Uuid, id: i64) -> Self {
        Self { kind, database, id }
    }

    /// Parse the textual form produced by `Display`
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let mut parts = s.splitn(3, ':');
        let (Some(tag), Some(database), Some(id)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DomainError::InvalidElementId(s.to_string()));
        };

        let kind = EntityKind::from_tag(tag)
            .ok_or_else(|| DomainError::InvalidElementId(s.to_string()))?;
        let database = uuid::Uuid::parse_str(database)
            .map_err(|e| DomainError::InvalidElementId(format!("{}: {}", s, e)))?;
        let id = id
            .parse::<i64>()
            .map_err(|e| DomainError::InvalidElementId(format!("{}: {}", s, e)))?;

        Ok(Self { kind, database, id })
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.tag(), self.database, self.id)
    }
}

/// A node snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Internal id
    pub id: NodeId,

    /// Stable element id
    pub element_id: String,

    /// Labels in store order
    #[serde(default)]
    pub labels: Vec<String>,

    /// Properties
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Create an unlabeled node without properties
    pub fn new(id: NodeId, element_id: impl Into<String>) -> Self {
        Self {
            id,
            element_id: element_id.into(),
            labels: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Replace the labels (builder pattern)
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set one property (builder pattern)
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace all properties (builder pattern)
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Check whether the node carries a label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Labels joined with `:` (empty string for unlabeled nodes)
    pub fn label_string(&self) -> String {
        self.labels.join(":")
    }
}

/// A relationship snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Internal id
    pub id: RelId,

    /// Stable element id
    pub element_id: String,

    /// Relationship type
    pub rel_type: String,

    /// Start node id
    pub start: NodeId,

    /// End node id
    pub end: NodeId,

    /// Properties
    #[serde(default)]
    pub properties: Properties,
}

impl Relationship {
    /// Create a relationship without properties
    pub fn new(
        id: RelId,
        element_id: impl Into<String>,
        rel_type: impl Into<String>,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        Self {
            id,
            element_id: element_id.into(),
            rel_type: rel_type.into(),
            start,
            end,
            properties: Properties::new(),
        }
    }

    /// Set one property (builder pattern)
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace all properties (builder pattern)
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The node on the other side of `node`, if `node` is an endpoint
    pub fn other_node(&self, node: NodeId) -> Option<NodeId> {
        if self.start == node {
            Some(self.end)
        } else if self.end == node {
            Some(self.start)
        } else {
            None
        }
    }

    /// Whether the relationship joins `a` and `b` in either direction
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}
