//! Persisted records of views and whole workspaces.
//!
//! A [`WorkspaceDocument`] is what the command line tool reads and writes:
//! the model's record tree from [`archgraph_core::record`] plus one
//! [`ViewRecord`] per view. View records refer to elements and relationships
//! by id and are resolved against the hydrated model.

use serde::{Deserialize, Serialize};

use archgraph_core::record::ModelRecord;

use crate::view::{Animation, ElementView, RelationshipView, ViewKind, layout::AutomaticLayout};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: ModelRecord,
    #[serde(default)]
    pub views: ViewSetRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSetRecord {
    #[serde(default)]
    pub views: Vec<ViewRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub key: String,
    pub kind: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Software system, container, or dynamic view scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    /// Environment of a deployment view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_boundary_visible: Option<bool>,
    #[serde(default)]
    pub elements: Vec<ElementView>,
    #[serde(default)]
    pub relationships: Vec<RelationshipView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_layout: Option<AutomaticLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
}
