//! Element types of the architecture graph.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{
    identifier::{ElementId, RelationshipId},
    model::tags::{self, Tags},
};

/// The closed set of element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Person,
    SoftwareSystem,
    Container,
    Component,
    DeploymentNode,
    InfrastructureNode,
    ContainerInstance,
}

impl ElementKind {
    /// Returns the tags every element of this kind carries.
    ///
    /// Container instances have none of their own; they mirror their
    /// container's tags.
    pub fn required_tags(self) -> &'static [&'static str] {
        match self {
            Self::Person => &[tags::ELEMENT, tags::PERSON],
            Self::SoftwareSystem => &[tags::ELEMENT, tags::SOFTWARE_SYSTEM],
            Self::Container => &[tags::ELEMENT, tags::CONTAINER],
            Self::Component => &[tags::ELEMENT, tags::COMPONENT],
            Self::DeploymentNode => &[tags::ELEMENT, tags::DEPLOYMENT_NODE],
            Self::InfrastructureNode => &[tags::ELEMENT, tags::INFRASTRUCTURE_NODE],
            Self::ContainerInstance => &[],
        }
    }

    /// Returns a human-readable name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::SoftwareSystem => "software system",
            Self::Container => "container",
            Self::Component => "component",
            Self::DeploymentNode => "deployment node",
            Self::InfrastructureNode => "infrastructure node",
            Self::ContainerInstance => "container instance",
        }
    }

    /// Returns `true` for kinds that belong to the deployment topology.
    pub fn is_deployment(self) -> bool {
        matches!(
            self,
            Self::DeploymentNode | Self::InfrastructureNode | Self::ContainerInstance
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a person or software system sits inside or outside the enterprise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Internal,
    External,
    #[default]
    Unspecified,
}

/// An HTTP health check attached to a container instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpHealthCheck {
    pub name: String,
    pub url: String,
    /// Polling interval in seconds.
    #[serde(default)]
    pub interval: u32,
    /// Timeout in milliseconds.
    #[serde(default)]
    pub timeout: u64,
}

/// Variant-specific element data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementDetail {
    Person {
        location: Location,
    },
    SoftwareSystem {
        location: Location,
    },
    Container {
        technology: Option<String>,
    },
    Component {
        technology: Option<String>,
        code_type: Option<String>,
        supporting_types: IndexSet<String>,
        size: u64,
    },
    DeploymentNode {
        environment: String,
        technology: Option<String>,
        instances: u32,
    },
    InfrastructureNode {
        environment: String,
        technology: Option<String>,
    },
    ContainerInstance {
        container: ElementId,
        instance_id: u32,
        environment: String,
        health_checks: Vec<HttpHealthCheck>,
    },
}

impl ElementDetail {
    /// Returns the element kind this detail belongs to.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Person { .. } => ElementKind::Person,
            Self::SoftwareSystem { .. } => ElementKind::SoftwareSystem,
            Self::Container { .. } => ElementKind::Container,
            Self::Component { .. } => ElementKind::Component,
            Self::DeploymentNode { .. } => ElementKind::DeploymentNode,
            Self::InfrastructureNode { .. } => ElementKind::InfrastructureNode,
            Self::ContainerInstance { .. } => ElementKind::ContainerInstance,
        }
    }
}

/// A node in the architecture graph.
///
/// Parent, children and relationships are identifiers resolved through the
/// owning [`Model`](crate::model::Model). Equality and hashing use the
/// canonical name only, so two elements are the same element exactly when
/// they occupy the same place in the containment tree.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    name: String,
    description: String,
    canonical_name: String,
    tags: Tags,
    url: Option<String>,
    properties: IndexMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    relationships: Vec<RelationshipId>,
    detail: ElementDetail,
}

impl Element {
    pub(crate) fn new(
        id: ElementId,
        name: String,
        description: String,
        canonical_name: String,
        parent: Option<ElementId>,
        tags: Tags,
        detail: ElementDetail,
    ) -> Self {
        Self {
            id,
            name,
            description,
            canonical_name,
            tags,
            url: None,
            properties: IndexMap::new(),
            parent,
            children: Vec::new(),
            relationships: Vec::new(),
            detail,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Slash-delimited path of this element within the containment tree.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn kind(&self) -> ElementKind {
        self.detail.kind()
    }

    pub fn detail(&self) -> &ElementDetail {
        &self.detail
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Returns the parent element id, or `None` for people, software systems
    /// and top-level deployment nodes.
    pub fn parent(&self) -> Option<&ElementId> {
        self.parent.as_ref()
    }

    /// Returns the ids of directly contained elements in creation order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Returns the ids of outgoing relationships in creation order.
    pub fn relationships(&self) -> &[RelationshipId] {
        &self.relationships
    }

    /// Returns the location of a person or software system.
    pub fn location(&self) -> Option<Location> {
        match &self.detail {
            ElementDetail::Person { location } | ElementDetail::SoftwareSystem { location } => {
                Some(*location)
            }
            _ => None,
        }
    }

    /// Returns the technology of containers, components and nodes.
    pub fn technology(&self) -> Option<&str> {
        match &self.detail {
            ElementDetail::Container { technology }
            | ElementDetail::Component { technology, .. }
            | ElementDetail::DeploymentNode { technology, .. }
            | ElementDetail::InfrastructureNode { technology, .. } => technology.as_deref(),
            _ => None,
        }
    }

    /// Returns the deployment environment of deployment elements.
    pub fn environment(&self) -> Option<&str> {
        match &self.detail {
            ElementDetail::DeploymentNode { environment, .. }
            | ElementDetail::InfrastructureNode { environment, .. }
            | ElementDetail::ContainerInstance { environment, .. } => Some(environment),
            _ => None,
        }
    }

    /// Returns the instantiated container of a container instance.
    pub fn container(&self) -> Option<&ElementId> {
        match &self.detail {
            ElementDetail::ContainerInstance { container, .. } => Some(container),
            _ => None,
        }
    }

    /// Returns the 1-based instance number of a container instance.
    pub fn instance_id(&self) -> Option<u32> {
        match &self.detail {
            ElementDetail::ContainerInstance { instance_id, .. } => Some(*instance_id),
            _ => None,
        }
    }

    pub(crate) fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    pub(crate) fn detail_mut(&mut self) -> &mut ElementDetail {
        &mut self.detail
    }

    pub(crate) fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    pub(crate) fn properties_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.properties
    }

    pub(crate) fn push_child(&mut self, id: ElementId) {
        self.children.push(id);
    }

    pub(crate) fn push_relationship(&mut self, id: RelationshipId) {
        self.relationships.push(id);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name == other.canonical_name
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_name.hash(state);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind(), self.canonical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, canonical_name: &str) -> Element {
        Element::new(
            ElementId::new(id),
            "User".to_string(),
            String::new(),
            canonical_name.to_string(),
            None,
            Tags::with_required(ElementKind::Person.required_tags()),
            ElementDetail::Person {
                location: Location::External,
            },
        )
    }

    #[test]
    fn test_equality_ignores_id() {
        assert_eq!(person("1", "/User"), person("2", "/User"));
        assert_ne!(person("1", "/User"), person("1", "/Admin"));
    }

    #[test]
    fn test_accessors_by_variant() {
        let element = person("1", "/User");

        assert_eq!(element.kind(), ElementKind::Person);
        assert_eq!(element.location(), Some(Location::External));
        assert_eq!(element.technology(), None);
        assert_eq!(element.environment(), None);
        assert_eq!(element.to_string(), "person `/User`");
    }

    #[test]
    fn test_container_instance_has_no_required_tags() {
        assert!(ElementKind::ContainerInstance.required_tags().is_empty());
        assert!(ElementKind::ContainerInstance.is_deployment());
        assert!(!ElementKind::Container.is_deployment());
    }
}
