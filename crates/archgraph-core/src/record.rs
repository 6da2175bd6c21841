//! Persisted record tree of a model.
//!
//! Records mirror the containment tree: software systems hold their
//! containers, containers their components, deployment nodes their children,
//! infrastructure nodes and container instances. Relationships are stored on
//! their source element and refer to elements by id. Field names are
//! camelCase on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{DEFAULT_ENVIRONMENT, HttpHealthCheck, InteractionStyle, Location};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<EnterpriseRecord>,
    #[serde(default)]
    pub people: Vec<PersonRecord>,
    #[serde(default)]
    pub software_systems: Vec<SoftwareSystemRecord>,
    #[serde(default)]
    pub deployment_nodes: Vec<DeploymentNodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseRecord {
    pub name: String,
}

/// Fields shared by every named element record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareSystemRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub containers: Vec<ContainerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    /// Primary code type implementing the component.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub code_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supporting_types: Vec<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentNodeRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(default)]
    pub children: Vec<DeploymentNodeRecord>,
    #[serde(default)]
    pub infrastructure_nodes: Vec<InfrastructureNodeRecord>,
    #[serde(default)]
    pub container_instances: Vec<ContainerInstanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureNodeRecord {
    #[serde(flatten)]
    pub element: ElementRecord,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
}

/// A deployed container. Name and tags come from the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstanceRecord {
    pub id: String,
    pub container_id: String,
    /// 1-based instance number; 0 assigns the next free number.
    #[serde(default)]
    pub instance_id: u32,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_checks: Vec<HttpHealthCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub id: String,
    /// Defaults to the element the record is stored on.
    #[serde(default)]
    pub source_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default)]
    pub interaction_style: InteractionStyle,
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_relationship_id: Option<String>,
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_instances() -> u32 {
    1
}
