//! Error type for element graph operations.

use thiserror::Error;

use crate::{
    identifier::{ElementId, RelationshipId},
    model::ElementKind,
};

/// Errors raised while building or reconstructing a [`Model`](crate::model::Model).
///
/// Every failing operation leaves the model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A {kind} named `{name}` already exists in this scope")]
    DuplicateName { kind: ElementKind, name: String },

    #[error("Element `{0}` does not exist in this model")]
    UnknownElement(ElementId),

    #[error("Relationship `{0}` does not exist in this model")]
    UnknownRelationship(RelationshipId),

    #[error("Element `{id}` is a {actual}, expected a {expected}")]
    WrongKind {
        id: ElementId,
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("Container instance `{0}` inherits its tags from its container")]
    InheritedTags(ElementId),

    #[error("Identifier `{0}` is used more than once")]
    DuplicateId(String),
}
