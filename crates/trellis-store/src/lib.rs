//! Trellis Storage Layer
//!
//! Implements the `GraphStore` trait on top of SQLite.
//!
//! # Architecture
//!
//! - One row per node and per relationship, properties encoded as JSON
//! - Labels in their own table so label scans use an index
//! - A per-database uuid, generated on first open, qualifies element ids
//!
//! # Examples
//!
//! ```no_run
//! use trellis_store::SqliteGraph;
//!
//! let store = SqliteGraph::new("graph.db").unwrap();
//! // Store is now ready for graph operations
//! ```

#![warn(missing_docs)]

pub mod refactor;

pub use refactor::set_relationship_type;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path as FsPath;
use thiserror::Error;
use tracing::{debug, warn};
use trellis_domain::{
    Direction, ElementId, EntityKind, ExpandSpec, GraphStore, Node, NodeId, NodeResolver, Path,
    Properties, RelId, Relationship, Value,
};
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Property value that cannot be stored
    #[error("Property '{key}' cannot hold a {type_name} value")]
    InvalidProperty {
        /// Property key
        key: String,
        /// Type of the rejected value
        type_name: &'static str,
    },

    /// Property encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// SQLite-based implementation of GraphStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteGraph instance.
pub struct SqliteGraph {
    conn: Connection,
    database: Uuid,
}

impl SqliteGraph {
    /// Open (or create) a graph database at the given path
    ///
    /// Use `:memory:` for an in-memory database.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use trellis_store::SqliteGraph;
    ///
    /// let store = SqliteGraph::new("graph.db").unwrap();
    /// ```
    pub fn new<P: AsRef<FsPath>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Fresh in-memory graph
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        let database = Self::database_uuid(&conn)?;
        debug!(%database, "graph store opened");
        Ok(Self { conn, database })
    }

    /// Read the database uuid, generating it on first open
    fn database_uuid(conn: &Connection) -> Result<Uuid, StoreError> {
        let existing: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'database_id'", [], |row| row.get(0))
            .optional()?;

        match existing {
            Some(text) => Uuid::parse_str(&text)
                .map_err(|e| StoreError::InvalidData(format!("database id '{}': {}", text, e))),
            None => {
                let database = Uuid::now_v7();
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('database_id', ?1)",
                    params![database.to_string()],
                )?;
                Ok(database)
            }
        }
    }

    /// Uuid qualifying this database's element ids
    pub fn database_id(&self) -> Uuid {
        self.database
    }

    /// Number of nodes
    pub fn node_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM relationships", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Delete every node and relationship
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM relationships", [])?;
        tx.execute("DELETE FROM node_labels", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        tx.commit()?;
        Ok(())
    }

    fn element_id(&self, kind: EntityKind, id: i64) -> String {
        ElementId::new(kind, self.database, id).to_string()
    }

    /// Reject values that cannot live in a property and drop nulls
    fn storable_properties(properties: Properties) -> Result<Properties, StoreError> {
        let mut stored = Properties::new();
        for (key, value) in properties {
            if value.is_null() {
                continue;
            }
            if !value.is_storable() {
                return Err(StoreError::InvalidProperty {
                    key,
                    type_name: value.type_name(),
                });
            }
            stored.insert(key, value);
        }
        Ok(stored)
    }

    fn encode_properties(properties: &Properties) -> Result<String, StoreError> {
        Ok(serde_json::to_string(properties)?)
    }

    fn decode_properties(text: &str) -> Result<Properties, StoreError> {
        Ok(serde_json::from_str(text)?)
    }

    fn labels(&self, id: i64) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT label FROM node_labels WHERE node_id = ?1 ORDER BY position")?;
        let labels = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(labels)
    }

    fn build_node(&self, id: i64, properties: &str) -> Result<Node, StoreError> {
        Ok(Node::new(NodeId::new(id), self.element_id(EntityKind::Node, id))
            .with_labels(self.labels(id)?)
            .with_properties(Self::decode_properties(properties)?))
    }

    fn build_relationship(&self, row: RelationshipRow) -> Result<Relationship, StoreError> {
        let (id, rel_type, start, end, properties) = row;
        Ok(Relationship::new(
            RelId::new(id),
            self.element_id(EntityKind::Relationship, id),
            rel_type,
            NodeId::new(start),
            NodeId::new(end),
        )
        .with_properties(Self::decode_properties(&properties)?))
    }

    fn require_node(&self, id: NodeId) -> Result<Node, StoreError> {
        self.node(id)?
            .ok_or_else(|| StoreError::NotFound(format!("Node {}", id)))
    }

    /// Depth-first extension of `path`, never reusing a relationship
    fn expand_from(
        &self,
        path: &Path,
        used: &mut Vec<RelId>,
        spec: &ExpandSpec,
        found: &mut Vec<Path>,
    ) -> Result<(), StoreError> {
        let depth = path.length();
        if spec.accepts(depth) {
            found.push(path.clone());
        }
        if !spec.can_extend(depth) {
            return Ok(());
        }

        let current = path.end_node().id;
        for rel in self.relationships(current, spec.direction, spec.rel_type.as_deref())? {
            if used.contains(&rel.id) {
                continue;
            }
            let Some(other) = rel.other_node(current) else {
                continue;
            };
            let node = self.require_node(other)?;
            let rel_id = rel.id;

            let mut next = path.clone();
            next.append(rel, node)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;

            used.push(rel_id);
            self.expand_from(&next, used, spec, found)?;
            used.pop();
        }
        Ok(())
    }
}

type RelationshipRow = (i64, String, i64, i64, String);

const RELATIONSHIP_COLUMNS: &str = "id, rel_type, start_id, end_id, properties";

fn relationship_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RelationshipRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

impl GraphStore for SqliteGraph {
    type Error = StoreError;

    fn create_node(&mut self, labels: &[&str], properties: Properties) -> Result<Node, Self::Error> {
        let properties = Self::storable_properties(properties)?;
        let encoded = Self::encode_properties(&properties)?;

        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO nodes (properties) VALUES (?1)", params![encoded])?;
        let id = tx.last_insert_rowid();
        for (position, label) in labels.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO node_labels (node_id, position, label) VALUES (?1, ?2, ?3)",
                params![id, position as i64, label],
            )?;
        }
        tx.commit()?;

        self.require_node(NodeId::new(id))
    }

    fn create_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        properties: Properties,
    ) -> Result<Relationship, Self::Error> {
        self.require_node(start)?;
        self.require_node(end)?;
        let properties = Self::storable_properties(properties)?;

        self.conn.execute(
            "INSERT INTO relationships (rel_type, start_id, end_id, properties) VALUES (?1, ?2, ?3, ?4)",
            params![rel_type, start.value(), end.value(), Self::encode_properties(&properties)?],
        )?;
        let id = self.conn.last_insert_rowid();

        Ok(Relationship::new(
            RelId::new(id),
            self.element_id(EntityKind::Relationship, id),
            rel_type,
            start,
            end,
        )
        .with_properties(properties))
    }

    fn node(&self, id: NodeId) -> Result<Option<Node>, Self::Error> {
        let properties: Option<String> = self
            .conn
            .query_row(
                "SELECT properties FROM nodes WHERE id = ?1",
                params![id.value()],
                |row| row.get(0),
            )
            .optional()?;

        properties
            .map(|text| self.build_node(id.value(), &text))
            .transpose()
    }

    fn relationship(&self, id: RelId) -> Result<Option<Relationship>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM relationships WHERE id = ?1", RELATIONSHIP_COLUMNS),
                params![id.value()],
                relationship_row,
            )
            .optional()?;

        row.map(|row| self.build_relationship(row)).transpose()
    }

    fn nodes_with_label(&self, label: &str) -> Result<Vec<Node>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.properties FROM nodes n
             JOIN node_labels l ON l.node_id = n.id
             WHERE l.label = ?1 ORDER BY n.id",
        )?;
        let rows = stmt
            .query_map(params![label], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|(id, properties)| self.build_node(*id, properties))
            .collect()
    }

    fn set_node_property(&mut self, id: NodeId, key: &str, value: Value) -> Result<Node, Self::Error> {
        let mut node = self.require_node(id)?;
        if value.is_null() {
            node.properties.remove(key);
        } else if value.is_storable() {
            node.properties.insert(key.to_string(), value);
        } else {
            return Err(StoreError::InvalidProperty {
                key: key.to_string(),
                type_name: value.type_name(),
            });
        }

        self.conn.execute(
            "UPDATE nodes SET properties = ?1 WHERE id = ?2",
            params![Self::encode_properties(&node.properties)?, id.value()],
        )?;
        Ok(node)
    }

    fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>, Self::Error> {
        let mut sql = format!("SELECT {} FROM relationships WHERE ", RELATIONSHIP_COLUMNS);
        sql.push_str(match direction {
            Direction::Outgoing => "start_id = ?1",
            Direction::Incoming => "end_id = ?1",
            Direction::Both => "(start_id = ?1 OR end_id = ?1)",
        });
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(node.value())];
        if let Some(rel_type) = rel_type {
            sql.push_str(" AND rel_type = ?2");
            params.push(Box::new(rel_type.to_string()));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(&param_refs[..], relationship_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.build_relationship(row)).collect()
    }

    fn delete_relationship(&mut self, id: RelId) -> Result<(), Self::Error> {
        let deleted = self
            .conn
            .execute("DELETE FROM relationships WHERE id = ?1", params![id.value()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("Relationship {}", id)));
        }
        Ok(())
    }

    fn detach_delete_node(&mut self, id: NodeId) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM relationships WHERE start_id = ?1 OR end_id = ?1",
            params![id.value()],
        )?;
        tx.execute("DELETE FROM node_labels WHERE node_id = ?1", params![id.value()])?;
        let deleted = tx.execute("DELETE FROM nodes WHERE id = ?1", params![id.value()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("Node {}", id)));
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_relationship_type(&mut self, id: RelId, new_type: &str) -> Result<Relationship, Self::Error> {
        let original = self
            .relationship(id)?
            .ok_or_else(|| StoreError::NotFound(format!("Relationship {}", id)))?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO relationships (rel_type, start_id, end_id, properties)
             SELECT ?1, start_id, end_id, properties FROM relationships WHERE id = ?2",
            params![new_type, id.value()],
        )?;
        let replacement = tx.last_insert_rowid();
        tx.execute("DELETE FROM relationships WHERE id = ?1", params![id.value()])?;
        tx.commit()?;

        Ok(Relationship::new(
            RelId::new(replacement),
            self.element_id(EntityKind::Relationship, replacement),
            new_type,
            original.start,
            original.end,
        )
        .with_properties(original.properties))
    }

    fn expand(&self, start: NodeId, spec: &ExpandSpec) -> Result<Vec<Path>, Self::Error> {
        let root = Path::single(self.require_node(start)?);
        let mut found = Vec::new();
        self.expand_from(&root, &mut Vec::new(), spec, &mut found)?;
        debug!(start = %start, paths = found.len(), "expanded");
        Ok(found)
    }
}

impl NodeResolver for SqliteGraph {
    fn resolve_node(&self, id: NodeId) -> Option<Node> {
        match self.node(id) {
            Ok(node) => node,
            Err(e) => {
                warn!(node = %id, error = %e, "node lookup failed");
                None
            }
        }
    }
}
