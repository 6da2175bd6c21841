//! Error types for archgraph operations.
//!
//! This module provides the main error type [`ArchgraphError`] which wraps
//! the error conditions that can occur while loading, deriving, and writing a
//! workspace, and [`ViewError`] for view projection failures.

use std::{fmt, io};

use thiserror::Error;

use archgraph_core::{ModelError, identifier::ElementId};

/// The main error type for archgraph operations.
///
/// # Diagnostic Variants
///
/// The `Document` variant carries the source text of the document that
/// failed to deserialize, so that the line and column reported by the JSON
/// parser can be turned into a labeled source span.
#[derive(Debug, Error)]
pub enum ArchgraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid workspace document: {err}")]
    Document { err: serde_json::Error, src: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchgraphError {
    /// Create a new `Document` error with the associated source text.
    pub fn new_document_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Document {
            err,
            src: src.into(),
        }
    }
}

/// The scoping rule of a dynamic view that an element violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    /// Unscoped views only show people and software systems.
    LandscapeElementsOnly,
    /// The scope element cannot be part of its own view.
    ScopeItself,
    /// The software system containing the scope container cannot be added.
    ParentOfScope,
    /// Only containers of the scope software system can be added.
    ContainerOutsideScope,
    /// Components cannot be added to a view scoped to a software system.
    ComponentsNotAllowed,
    /// Only components of the scope container can be added.
    ComponentOutsideScope,
    /// Deployment elements never appear in dynamic views.
    UnsupportedElementKind,
}

impl fmt::Display for ScopeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = match self {
            Self::LandscapeElementsOnly => {
                "only people and software systems can be added to an unscoped dynamic view"
            }
            Self::ScopeItself => "the scope of a dynamic view cannot be added to it",
            Self::ParentOfScope => "the software system containing the scope cannot be added",
            Self::ContainerOutsideScope => "only containers of the scope software system can be added",
            Self::ComponentsNotAllowed => {
                "components cannot be added to a dynamic view scoped to a software system"
            }
            Self::ComponentOutsideScope => "only components of the scope container can be added",
            Self::UnsupportedElementKind => "deployment elements cannot be added to a dynamic view",
        };
        f.write_str(rule)
    }
}

/// Errors raised while creating, populating, or restoring views.
///
/// Every failing operation leaves the view unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A view with key `{0}` already exists")]
    DuplicateKey(String),

    #[error("No view with key `{0}` exists")]
    UnknownView(String),

    #[error("Element `{element}` cannot be added to view `{view}`: {reason}")]
    ElementNotAllowed {
        element: ElementId,
        view: String,
        reason: String,
    },

    #[error("Element `{element}` violates the scope of the dynamic view: {rule}")]
    ScopeViolation { element: ElementId, rule: ScopeRule },

    #[error("No relationship between `{from}` and `{to}` exists in either direction")]
    MissingRelationship { from: ElementId, to: ElementId },

    #[error("None of the given elements are new to this view's animation")]
    EmptyAnimationStep,

    #[error("Element `{element}` is in environment `{actual}`, the view shows `{expected}`")]
    EnvironmentMismatch {
        element: ElementId,
        expected: String,
        actual: String,
    },

    #[error("Unbalanced sequence: {0}")]
    UnbalancedSequence(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
