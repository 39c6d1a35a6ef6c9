//! Domain error types

use thiserror::Error;

/// Errors raised when a domain invariant is violated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Path nodes and relationships do not alternate correctly
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Element id string could not be parsed
    #[error("Invalid element id: {0}")]
    InvalidElementId(String),

    /// Unknown coordinate reference system name
    #[error("Unknown coordinate reference system: {0}")]
    UnknownCrs(String),

    /// Point coordinates do not match the dimension of the CRS
    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}
