//! Relationship type refactoring
//!
//! A relationship's type is immutable, so changing it means creating a
//! replacement with the same endpoints and properties and deleting the
//! original. Each input id yields exactly one result record.

use std::fmt;

use tracing::{debug, warn};
use trellis_domain::{GraphStore, PendingUpdate, RelId, Relationship, UpdatedRelationshipResult};

/// Message reported for every id when the new type is blank
pub const EMPTY_TYPE_MESSAGE: &str = "Relationship type must not be empty";

/// Change the type of each listed relationship
///
/// Failures are recorded per item and never stop the batch. Results are
/// returned in input order.
///
/// # Examples
///
/// ```
/// use trellis_domain::{GraphStore, Properties};
/// use trellis_store::{set_relationship_type, SqliteGraph};
///
/// let mut store = SqliteGraph::in_memory().unwrap();
/// let a = store.create_node(&["Person"], Properties::new()).unwrap();
/// let b = store.create_node(&["Person"], Properties::new()).unwrap();
/// let rel = store.create_relationship(a.id, b.id, "KNOWS", Properties::new()).unwrap();
///
/// let results = set_relationship_type(&mut store, &[rel.id], "LIKES");
/// assert_eq!(results[0].output().unwrap().rel_type, "LIKES");
/// ```
pub fn set_relationship_type<S>(
    store: &mut S,
    ids: &[RelId],
    new_type: &str,
) -> Vec<UpdatedRelationshipResult>
where
    S: GraphStore,
    S::Error: fmt::Display,
{
    let blank = new_type.trim().is_empty();

    ids.iter()
        .map(|&id| {
            let pending = PendingUpdate::new(id);
            if blank {
                return pending.with_error(EMPTY_TYPE_MESSAGE);
            }
            match retype(store, id, new_type) {
                Ok(replacement) => {
                    debug!(input = %id, output = %replacement.id, new_type, "relationship retyped");
                    pending.with_other(replacement)
                }
                Err(message) => {
                    warn!(input = %id, error = %message, "relationship not retyped");
                    pending.with_error(message)
                }
            }
        })
        .collect()
}

fn retype<S>(store: &mut S, id: RelId, new_type: &str) -> Result<Relationship, String>
where
    S: GraphStore,
    S::Error: fmt::Display,
{
    let original = store
        .relationship(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Relationship {} not found", id))?;

    store
        .replace_relationship_type(original.id, new_type)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteGraph;
    use trellis_domain::{Properties, Value};

    fn knows_pair(store: &mut SqliteGraph) -> Relationship {
        let a = store.create_node(&["Person"], Properties::new()).unwrap();
        let b = store.create_node(&["Person"], Properties::new()).unwrap();
        let mut properties = Properties::new();
        properties.insert("since".to_string(), Value::from(2010));
        store.create_relationship(a.id, b.id, "KNOWS", properties).unwrap()
    }

    #[test]
    fn test_retype_keeps_endpoints_and_properties() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let rel = knows_pair(&mut store);

        let results = set_relationship_type(&mut store, &[rel.id], "LIKES");
        let replacement = results[0].output().unwrap();

        assert_eq!(results[0].input(), rel.id);
        assert_eq!(replacement.start, rel.start);
        assert_eq!(replacement.end, rel.end);
        assert_eq!(replacement.property("since"), Some(&Value::from(2010)));
        assert!(store.relationship(rel.id).unwrap().is_none());
    }

    #[test]
    fn test_blank_type_fails_every_item() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let rel = knows_pair(&mut store);

        let results = set_relationship_type(&mut store, &[rel.id, RelId::new(999)], "  ");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.error() == Some(EMPTY_TYPE_MESSAGE)));
        assert!(store.relationship(rel.id).unwrap().is_some());
    }

    #[test]
    fn test_failed_delete_leaves_graph_unchanged() {
        let mut store = SqliteGraph::in_memory().unwrap();
        let rel = knows_pair(&mut store);
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER keep_relationships BEFORE DELETE ON relationships
                 BEGIN SELECT RAISE(ABORT, 'relationships are read-only'); END;",
            )
            .unwrap();

        let results = set_relationship_type(&mut store, &[rel.id], "LIKES");

        assert_eq!(results[0].input(), rel.id);
        assert!(results[0].error().unwrap().contains("relationships are read-only"));
        assert_eq!(store.relationship_count().unwrap(), 1);
        assert_eq!(store.relationship(rel.id).unwrap().unwrap().rel_type, "KNOWS");
    }

    #[test]
    fn test_empty_batch() {
        let mut store = SqliteGraph::in_memory().unwrap();
        assert!(set_relationship_type(&mut store, &[], "LIKES").is_empty());
    }
}
