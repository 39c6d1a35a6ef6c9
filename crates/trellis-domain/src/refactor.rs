//! Outcome records for relationship refactorings
//!
//! A batch refactoring reports one record per input relationship instead
//! of aborting on the first failure. A record starts as a
//! [`PendingUpdate`] and is completed exactly once, either with the
//! replacement relationship or with an error message.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{RelId, Relationship};

/// A refactoring attempt whose outcome is not known yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpdate {
    input: RelId,
}

impl PendingUpdate {
    /// Start a record for the relationship being refactored
    pub fn new(input: RelId) -> Self {
        Self { input }
    }

    /// Id of the relationship being refactored
    pub fn input(&self) -> RelId {
        self.input
    }

    /// Complete the record with the replacement relationship
    pub fn with_other(self, relationship: Relationship) -> UpdatedRelationshipResult {
        UpdatedRelationshipResult {
            input: self.input,
            outcome: RelationshipUpdate::Updated(relationship),
        }
    }

    /// Complete the record with an error message
    ///
    /// Accepts anything displayable: error values contribute their
    /// message, plain strings are taken literally.
    pub fn with_error(self, error: impl fmt::Display) -> UpdatedRelationshipResult {
        UpdatedRelationshipResult {
            input: self.input,
            outcome: RelationshipUpdate::Failed(error.to_string()),
        }
    }
}

/// How a single refactoring attempt ended
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipUpdate {
    /// The relationship was replaced
    Updated(Relationship),
    /// The attempt failed with a message
    Failed(String),
}

/// The completed outcome for one relationship
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedRelationshipResult {
    input: RelId,
    outcome: RelationshipUpdate,
}

impl UpdatedRelationshipResult {
    /// Id of the original relationship
    pub fn input(&self) -> RelId {
        self.input
    }

    /// The outcome
    pub fn outcome(&self) -> &RelationshipUpdate {
        &self.outcome
    }

    /// The replacement relationship, on success
    pub fn output(&self) -> Option<&Relationship> {
        match &self.outcome {
            RelationshipUpdate::Updated(rel) => Some(rel),
            RelationshipUpdate::Failed(_) => None,
        }
    }

    /// The error message, on failure
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RelationshipUpdate::Updated(_) => None,
            RelationshipUpdate::Failed(message) => Some(message),
        }
    }

    /// Whether the refactoring succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RelationshipUpdate::Updated(_))
    }
}

impl Serialize for UpdatedRelationshipResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("UpdatedRelationshipResult", 3)?;
        record.serialize_field("input", &self.input)?;
        record.serialize_field("output", &self.output())?;
        record.serialize_field("error", &self.error())?;
        record.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    fn replacement() -> Relationship {
        Relationship::new(RelId::new(99), "r99", "LIKES", NodeId::new(1), NodeId::new(2))
    }

    #[test]
    fn test_with_other_sets_output_only() {
        let result = PendingUpdate::new(RelId::new(7)).with_other(replacement());

        assert_eq!(result.input(), RelId::new(7));
        assert_eq!(result.output().map(|r| r.id), Some(RelId::new(99)));
        assert!(result.error().is_none());
        assert!(result.is_success());
    }

    #[test]
    fn test_with_error_from_message() {
        let result = PendingUpdate::new(RelId::new(7)).with_error("type must not be empty");

        assert_eq!(result.input(), RelId::new(7));
        assert_eq!(result.error(), Some("type must not be empty"));
        assert!(result.output().is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_with_error_from_error_value() {
        let err = crate::DomainError::InvalidPath("broken".to_string());
        let result = PendingUpdate::new(RelId::new(3)).with_error(&err);

        assert_eq!(result.error(), Some("Invalid path: broken"));
    }

    #[test]
    fn test_serialized_shape() {
        let ok = PendingUpdate::new(RelId::new(1)).with_other(replacement());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["input"], 1);
        assert_eq!(json["output"]["rel_type"], "LIKES");
        assert!(json["error"].is_null());

        let failed = PendingUpdate::new(RelId::new(2)).with_error("boom");
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json["output"].is_null());
        assert_eq!(json["error"], "boom");
    }
}
