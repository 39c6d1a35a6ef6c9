//! Trellis Domain Layer
//!
//! This crate defines the property-graph value model that every other
//! Trellis crate works with. It holds no storage or conversion logic, only
//! the fundamental types and the trait boundary towards graph storage.
//!
//! ## Key Concepts
//!
//! - **Node / Relationship**: snapshots of stored graph entities, carrying
//!   both a numeric id and a stable element id
//! - **Path**: an alternating node/relationship sequence
//! - **Value**: any value a graph query can produce, from scalars and
//!   temporal values up to nodes and paths
//! - **UpdatedRelationshipResult**: the per-relationship outcome of a
//!   relationship-type refactoring
//!
//! ## Architecture
//!
//! - Pure data types and invariants only
//! - Storage implementations live in `trellis-store`
//! - Conversions live in `trellis-convert`
//! - [`traits::GraphStore`] is the single seam towards a database

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod error;
pub mod path;
pub mod refactor;
pub mod spatial;
pub mod temporal;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use entity::{ElementId, EntityKind, Node, NodeId, Properties, RelId, Relationship};
pub use error::DomainError;
pub use path::{Path, PathEntity};
pub use refactor::{PendingUpdate, RelationshipUpdate, UpdatedRelationshipResult};
pub use spatial::{Crs, Point};
pub use temporal::{Duration, Time};
pub use traits::{Direction, ExpandSpec, GraphStore, NodeResolver};
pub use value::Value;
