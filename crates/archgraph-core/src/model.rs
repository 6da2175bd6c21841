//! The element graph.
//!
//! A [`Model`] owns every element and relationship of an architecture in two
//! flat, id-keyed tables. Parent links, child lists, and relationship
//! endpoints are stored as identifiers and resolved through those tables, so
//! the graph contains no reference cycles and maps one-to-one onto the
//! persisted record format.
//!
//! # Organization
//!
//! - [`element`] - [`Element`], [`ElementKind`], and variant data
//! - [`relationship`] - [`Relationship`] and [`InteractionStyle`]
//! - [`tags`] - [`Tags`] and the well-known tag names
//! - `implied` - the implicit relationship pass
//! - `hydrate` - reconstruction from and conversion to records
//!
//! # Example
//!
//! ```
//! use archgraph_core::model::Model;
//!
//! let mut model = Model::new();
//! let user = model.add_person("User", "A user of the system").unwrap();
//! let system = model.add_software_system("Shop", "Sells things").unwrap();
//! let web = model.add_container(&system, "Web", "Storefront", Some("Rust")).unwrap();
//!
//! model.uses(&user, &web, "Browses", Some("HTTPS")).unwrap();
//!
//! assert_eq!(model.element(&web).unwrap().canonical_name(), "/Shop/Web");
//! assert!(model.add_person("User", "Duplicate").is_err());
//! ```

pub mod element;
pub mod relationship;
pub mod tags;

mod hydrate;
mod implied;

pub use element::{Element, ElementDetail, ElementKind, HttpHealthCheck, Location};
pub use relationship::{InteractionStyle, Relationship};
pub use tags::Tags;

use std::iter;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    error::ModelError,
    identifier::{ElementId, IdGenerator, RelationshipId},
};

/// Environment used for deployment nodes created without one.
pub const DEFAULT_ENVIRONMENT: &str = "Default";

/// The architecture graph: elements, relationships, and their indices.
///
/// Elements and relationships are created only through the `add_*` factory
/// methods or through [`Model::hydrate`]; they are never removed.
#[derive(Debug, Clone, Default)]
pub struct Model {
    enterprise: Option<String>,
    id_generator: IdGenerator,
    elements: IndexMap<ElementId, Element>,
    relationships: IndexMap<RelationshipId, Relationship>,
    people: Vec<ElementId>,
    software_systems: Vec<ElementId>,
    deployment_nodes: Vec<ElementId>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the enterprise name, if one is set.
    pub fn enterprise(&self) -> Option<&str> {
        self.enterprise.as_deref()
    }

    /// Sets the enterprise that landscape views draw a boundary around.
    pub fn set_enterprise(&mut self, name: &str) -> Result<(), ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::InvalidArgument(
                "an enterprise name must be specified".to_string(),
            ));
        }
        self.enterprise = Some(name.to_owned());
        Ok(())
    }

    // =========================================================================
    // Element factories
    // =========================================================================

    /// Adds a person. Names are unique across people and software systems.
    pub fn add_person(&mut self, name: &str, description: &str) -> Result<ElementId, ModelError> {
        let detail = ElementDetail::Person {
            location: Location::default(),
        };
        self.create_element(None, None, name, description, detail)
    }

    /// Adds a software system. Names are unique across people and software systems.
    pub fn add_software_system(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<ElementId, ModelError> {
        let detail = ElementDetail::SoftwareSystem {
            location: Location::default(),
        };
        self.create_element(None, None, name, description, detail)
    }

    /// Adds a container to a software system.
    pub fn add_container(
        &mut self,
        software_system: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(software_system, ElementKind::SoftwareSystem)?;
        let detail = ElementDetail::Container {
            technology: technology.map(str::to_owned),
        };
        self.create_element(None, Some(software_system), name, description, detail)
    }

    /// Adds a component to a container.
    pub fn add_component(
        &mut self,
        container: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.add_component_detail(container, name, None, description, technology)
    }

    /// Adds a component implemented by the given primary code type.
    ///
    /// This is the entry point used by component discovery.
    pub fn add_component_with_type(
        &mut self,
        container: &ElementId,
        name: &str,
        code_type: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.add_component_detail(container, name, Some(code_type), description, technology)
    }

    fn add_component_detail(
        &mut self,
        container: &ElementId,
        name: &str,
        code_type: Option<&str>,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        self.expect_kind(container, ElementKind::Container)?;
        let detail = ElementDetail::Component {
            technology: technology.map(str::to_owned),
            code_type: code_type.map(str::to_owned),
            supporting_types: Default::default(),
            size: 0,
        };
        self.create_element(None, Some(container), name, description, detail)
    }

    /// Records an additional code type that implements a component.
    pub fn add_supporting_type(
        &mut self,
        component: &ElementId,
        code_type: &str,
    ) -> Result<(), ModelError> {
        let code_type = code_type.trim();
        if code_type.is_empty() {
            return Err(ModelError::InvalidArgument(
                "a supporting type must be specified".to_string(),
            ));
        }
        self.expect_kind(component, ElementKind::Component)?;
        if let ElementDetail::Component {
            supporting_types, ..
        } = self.element_mut(component)?.detail_mut()
        {
            supporting_types.insert(code_type.to_owned());
        }
        Ok(())
    }

    /// Sets the size of a component, e.g. its number of lines of code.
    pub fn set_component_size(&mut self, component: &ElementId, size: u64) -> Result<(), ModelError> {
        self.expect_kind(component, ElementKind::Component)?;
        if let ElementDetail::Component { size: current, .. } =
            self.element_mut(component)?.detail_mut()
        {
            *current = size;
        }
        Ok(())
    }

    /// Adds a top-level deployment node.
    ///
    /// Names are unique among the top-level nodes of one environment. A
    /// missing or blank environment means [`DEFAULT_ENVIRONMENT`].
    pub fn add_deployment_node(
        &mut self,
        environment: Option<&str>,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        let environment = environment
            .map(str::trim)
            .filter(|environment| !environment.is_empty())
            .unwrap_or(DEFAULT_ENVIRONMENT);
        let detail = ElementDetail::DeploymentNode {
            environment: environment.to_owned(),
            technology: technology.map(str::to_owned),
            instances: 1,
        };
        self.create_element(None, None, name, description, detail)
    }

    /// Adds a deployment node nested in another one, inheriting its environment.
    pub fn add_child_deployment_node(
        &mut self,
        parent: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        let environment = self.node_environment(parent)?;
        let detail = ElementDetail::DeploymentNode {
            environment,
            technology: technology.map(str::to_owned),
            instances: 1,
        };
        self.create_element(None, Some(parent), name, description, detail)
    }

    /// Adds an infrastructure node (load balancer, firewall, DNS, ...) to a
    /// deployment node.
    pub fn add_infrastructure_node(
        &mut self,
        parent: &ElementId,
        name: &str,
        description: &str,
        technology: Option<&str>,
    ) -> Result<ElementId, ModelError> {
        let environment = self.node_environment(parent)?;
        let detail = ElementDetail::InfrastructureNode {
            environment,
            technology: technology.map(str::to_owned),
        };
        self.create_element(None, Some(parent), name, description, detail)
    }

    /// Deploys a container onto a deployment node.
    ///
    /// The instance number is one more than the number of existing instances
    /// of the same container. Every relationship between the new instance's
    /// container and the container of any other existing instance is
    /// replicated between the two instances, in both directions.
    pub fn add_container_instance(
        &mut self,
        deployment_node: &ElementId,
        container: &ElementId,
    ) -> Result<ElementId, ModelError> {
        let environment = self.node_environment(deployment_node)?;
        let name = self
            .expect_kind(container, ElementKind::Container)?
            .name()
            .to_owned();
        let instance_id = self.container_instances_of(container).count() as u32 + 1;
        let existing: Vec<(ElementId, ElementId)> = self
            .elements
            .values()
            .filter_map(|element| {
                element
                    .container()
                    .map(|container| (element.id().clone(), container.clone()))
            })
            .collect();

        let detail = ElementDetail::ContainerInstance {
            container: container.clone(),
            instance_id,
            environment,
            health_checks: Vec::new(),
        };
        let id = self.create_element(None, Some(deployment_node), &name, "", detail)?;

        for (other, other_container) in existing {
            self.replicate_container_relationships(container, &other_container, &id, &other)?;
            self.replicate_container_relationships(&other_container, container, &other, &id)?;
        }

        Ok(id)
    }

    fn replicate_container_relationships(
        &mut self,
        source_container: &ElementId,
        destination_container: &ElementId,
        source_instance: &ElementId,
        destination_instance: &ElementId,
    ) -> Result<(), ModelError> {
        let templates: Vec<_> = self
            .efferent_relationships(source_container)
            .filter(|relationship| relationship.destination() == destination_container)
            .map(|relationship| {
                (
                    relationship.id().clone(),
                    relationship.description().to_owned(),
                    relationship.technology().map(str::to_owned),
                    relationship.interaction_style(),
                )
            })
            .collect();

        for (linked, description, technology, style) in templates {
            let created = self.create_relationship(
                None,
                source_instance,
                destination_instance,
                &description,
                technology,
                style,
            )?;
            if let Some(id) = created {
                if let Some(relationship) = self.relationships.get_mut(&id) {
                    relationship.set_linked_relationship(Some(linked));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Relationship factories
    // =========================================================================

    /// Adds a relationship from `source` to `destination`.
    ///
    /// Returns `Ok(None)` without changing the model if the source already has
    /// a relationship with the same destination and description.
    pub fn add_relationship(
        &mut self,
        source: &ElementId,
        destination: &ElementId,
        description: &str,
        technology: Option<&str>,
        interaction_style: Option<InteractionStyle>,
    ) -> Result<Option<RelationshipId>, ModelError> {
        self.create_relationship(
            None,
            source,
            destination,
            description,
            technology.map(str::to_owned),
            interaction_style.unwrap_or_default(),
        )
    }

    /// Adds a synchronous "uses" relationship.
    ///
    /// This is the entry point used by component discovery for usage edges.
    pub fn uses(
        &mut self,
        source: &ElementId,
        destination: &ElementId,
        description: &str,
        technology: Option<&str>,
    ) -> Result<Option<RelationshipId>, ModelError> {
        self.add_relationship(source, destination, description, technology, None)
    }

    // =========================================================================
    // Element attributes
    // =========================================================================

    /// Sets the location of a person or software system.
    pub fn set_location(&mut self, id: &ElementId, new_location: Location) -> Result<(), ModelError> {
        match self.element_mut(id)?.detail_mut() {
            ElementDetail::Person { location } | ElementDetail::SoftwareSystem { location } => {
                *location = new_location;
                Ok(())
            }
            _ => Err(ModelError::InvalidArgument(format!(
                "element `{id}` is neither a person nor a software system"
            ))),
        }
    }

    /// Sets how many instances of a deployment node exist. Must be at least 1.
    pub fn set_instances(&mut self, deployment_node: &ElementId, count: u32) -> Result<(), ModelError> {
        validate_instances(count)?;
        self.expect_kind(deployment_node, ElementKind::DeploymentNode)?;
        if let ElementDetail::DeploymentNode { instances, .. } =
            self.element_mut(deployment_node)?.detail_mut()
        {
            *instances = count;
        }
        Ok(())
    }

    /// Attaches an HTTP health check to a container instance.
    pub fn add_health_check(
        &mut self,
        container_instance: &ElementId,
        check: HttpHealthCheck,
    ) -> Result<(), ModelError> {
        if check.name.trim().is_empty() || check.url.trim().is_empty() {
            return Err(ModelError::InvalidArgument(
                "a health check needs a name and a url".to_string(),
            ));
        }
        self.expect_kind(container_instance, ElementKind::ContainerInstance)?;
        if let ElementDetail::ContainerInstance { health_checks, .. } =
            self.element_mut(container_instance)?.detail_mut()
        {
            health_checks.push(check);
        }
        Ok(())
    }

    /// Sets or clears (with a blank string) the url of an element.
    pub fn set_url(&mut self, id: &ElementId, url: &str) -> Result<(), ModelError> {
        let url = Some(url.trim()).filter(|url| !url.is_empty());
        self.element_mut(id)?.set_url(url.map(str::to_owned));
        Ok(())
    }

    /// Adds or replaces a property of an element.
    pub fn add_property(&mut self, id: &ElementId, key: &str, value: &str) -> Result<(), ModelError> {
        if key.trim().is_empty() {
            return Err(ModelError::InvalidArgument(
                "a property key must be specified".to_string(),
            ));
        }
        self.element_mut(id)?
            .properties_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Adds tags to an element.
    ///
    /// Tags added to a container are mirrored onto its instances. Container
    /// instances cannot be tagged directly.
    pub fn add_tags(&mut self, id: &ElementId, tags: &[&str]) -> Result<(), ModelError> {
        for target in self.tag_targets(id)? {
            let element = self.element_mut(&target)?;
            for tag in tags {
                element.tags_mut().add(tag);
            }
        }
        Ok(())
    }

    /// Removes a free-form tag from an element. Returns `false` if the tag
    /// was absent or required.
    pub fn remove_tag(&mut self, id: &ElementId, tag: &str) -> Result<bool, ModelError> {
        let mut removed = false;
        for target in self.tag_targets(id)? {
            removed |= self.element_mut(&target)?.tags_mut().remove(tag);
        }
        Ok(removed)
    }

    fn tag_targets(&self, id: &ElementId) -> Result<Vec<ElementId>, ModelError> {
        let element = self.element_or_err(id)?;
        match element.kind() {
            ElementKind::ContainerInstance => Err(ModelError::InheritedTags(id.clone())),
            ElementKind::Container => Ok(iter::once(id.clone())
                .chain(self.container_instances_of(id).map(|e| e.id().clone()))
                .collect()),
            _ => Ok(vec![id.clone()]),
        }
    }

    /// Adds tags to a relationship.
    pub fn add_relationship_tags(
        &mut self,
        id: &RelationshipId,
        tags: &[&str],
    ) -> Result<(), ModelError> {
        let relationship = self.relationship_mut(id)?;
        for tag in tags {
            relationship.tags_mut().add(tag);
        }
        Ok(())
    }

    /// Sets or clears (with a blank string) the url of a relationship.
    pub fn set_relationship_url(&mut self, id: &RelationshipId, url: &str) -> Result<(), ModelError> {
        let url = Some(url.trim()).filter(|url| !url.is_empty());
        self.relationship_mut(id)?.set_url(url.map(str::to_owned));
        Ok(())
    }

    /// Adds or replaces a property of a relationship.
    pub fn add_relationship_property(
        &mut self,
        id: &RelationshipId,
        key: &str,
        value: &str,
    ) -> Result<(), ModelError> {
        if key.trim().is_empty() {
            return Err(ModelError::InvalidArgument(
                "a property key must be specified".to_string(),
            ));
        }
        self.relationship_mut(id)?
            .properties_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Looks up an element by id.
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Returns the tags of an element. Container instances resolve to the
    /// tags of their container.
    pub fn tags(&self, id: &ElementId) -> Option<&Tags> {
        let element = self.elements.get(id)?;
        match element.container().and_then(|container| self.elements.get(container)) {
            Some(container) => Some(container.tags()),
            None => Some(element.tags()),
        }
    }

    /// Returns `true` if the element exists in this model.
    pub fn contains_element(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Looks up a relationship by id.
    pub fn relationship(&self, id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Iterates over all elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Iterates over all relationships in creation order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn people(&self) -> impl Iterator<Item = &Element> {
        self.resolve(&self.people)
    }

    pub fn software_systems(&self) -> impl Iterator<Item = &Element> {
        self.resolve(&self.software_systems)
    }

    /// Iterates over top-level deployment nodes of every environment.
    pub fn deployment_nodes(&self) -> impl Iterator<Item = &Element> {
        self.resolve(&self.deployment_nodes)
    }

    /// Returns the distinct deployment environments in creation order.
    pub fn environments(&self) -> Vec<&str> {
        let mut environments: Vec<&str> = Vec::new();
        for node in self.deployment_nodes() {
            if let Some(environment) = node.environment() {
                if !environments.contains(&environment) {
                    environments.push(environment);
                }
            }
        }
        environments
    }

    /// Iterates over the direct children of an element.
    pub fn children<'a>(&'a self, id: &ElementId) -> impl Iterator<Item = &'a Element> + use<'a> {
        let children = self
            .elements
            .get(id)
            .map(Element::children)
            .unwrap_or_default();
        self.resolve(children)
    }

    /// Returns the parent of an element.
    pub fn parent(&self, id: &ElementId) -> Option<&Element> {
        self.elements
            .get(id)
            .and_then(Element::parent)
            .and_then(|parent| self.elements.get(parent))
    }

    /// Iterates over the ancestors of an element, nearest first.
    pub fn ancestors<'a>(&'a self, id: &ElementId) -> impl Iterator<Item = &'a Element> + use<'a> {
        iter::successors(self.parent(id), move |element| {
            element.parent().and_then(|parent| self.elements.get(parent))
        })
    }

    /// Returns `true` if `ancestor` contains `descendant`, at any depth.
    pub fn is_ancestor(&self, ancestor: &ElementId, descendant: &ElementId) -> bool {
        self.ancestors(descendant)
            .any(|element| element.id() == ancestor)
    }

    /// Iterates over the outgoing relationships of an element.
    pub fn efferent_relationships<'a>(
        &'a self,
        id: &ElementId,
    ) -> impl Iterator<Item = &'a Relationship> + use<'a> {
        let relationships = self
            .elements
            .get(id)
            .map(Element::relationships)
            .unwrap_or_default();
        relationships
            .iter()
            .filter_map(move |id| self.relationships.get(id))
    }

    /// Returns `true` if `source` has any relationship to `destination`.
    pub fn has_efferent_relationship_with(&self, source: &ElementId, destination: &ElementId) -> bool {
        self.efferent_relationships(source)
            .any(|relationship| relationship.destination() == destination)
    }

    /// Iterates over the deployed instances of a container.
    pub fn container_instances_of<'a>(
        &'a self,
        container: &'a ElementId,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .values()
            .filter(move |element| element.container() == Some(container))
    }

    /// Looks up an element by its canonical name.
    pub fn element_with_canonical_name(&self, canonical_name: &str) -> Option<&Element> {
        self.elements
            .values()
            .find(|element| element.canonical_name() == canonical_name)
    }

    pub fn person_with_name(&self, name: &str) -> Option<&Element> {
        self.people().find(|person| person.name() == name)
    }

    pub fn software_system_with_name(&self, name: &str) -> Option<&Element> {
        self.software_systems().find(|system| system.name() == name)
    }

    /// Returns the element, failing if it is absent or of another kind.
    pub fn expect_kind(&self, id: &ElementId, expected: ElementKind) -> Result<&Element, ModelError> {
        let element = self.element_or_err(id)?;
        if element.kind() != expected {
            return Err(ModelError::WrongKind {
                id: id.clone(),
                expected,
                actual: element.kind(),
            });
        }
        Ok(element)
    }

    /// Returns the element, failing with [`ModelError::UnknownElement`] if absent.
    pub fn element_or_err(&self, id: &ElementId) -> Result<&Element, ModelError> {
        self.elements
            .get(id)
            .ok_or_else(|| ModelError::UnknownElement(id.clone()))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn resolve<'a>(&'a self, ids: &'a [ElementId]) -> impl Iterator<Item = &'a Element> + 'a {
        ids.iter().filter_map(move |id| self.elements.get(id))
    }

    fn element_mut(&mut self, id: &ElementId) -> Result<&mut Element, ModelError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownElement(id.clone()))
    }

    fn relationship_mut(&mut self, id: &RelationshipId) -> Result<&mut Relationship, ModelError> {
        self.relationships
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownRelationship(id.clone()))
    }

    fn node_environment(&self, deployment_node: &ElementId) -> Result<String, ModelError> {
        Ok(self
            .expect_kind(deployment_node, ElementKind::DeploymentNode)?
            .environment()
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_owned())
    }

    /// Takes `preset` as the identifier if given, otherwise generates one.
    fn assign_id(&mut self, preset: Option<&str>) -> Result<String, ModelError> {
        match preset {
            Some(id) if id.trim().is_empty() => Err(ModelError::InvalidArgument(
                "an identifier must not be blank".to_string(),
            )),
            Some(id) if self.id_generator.is_used(id) => Err(ModelError::DuplicateId(id.to_owned())),
            Some(id) => {
                self.id_generator.found(id);
                Ok(id.to_owned())
            }
            None => Ok(self.id_generator.generate_id()),
        }
    }

    /// Validates, constructs, links, and indexes a new element.
    ///
    /// `parent` must already have been checked to be of the right kind.
    fn create_element(
        &mut self,
        preset_id: Option<&str>,
        parent: Option<&ElementId>,
        name: &str,
        description: &str,
        detail: ElementDetail,
    ) -> Result<ElementId, ModelError> {
        let kind = detail.kind();
        if kind != ElementKind::ContainerInstance {
            validate_name(name)?;
        }
        let canonical_name = self.canonical_name_for(parent, name, &detail)?;
        if kind == ElementKind::ContainerInstance {
            self.ensure_unique_instance(parent, &canonical_name)?;
        } else {
            self.ensure_unique_name(parent, name, &detail)?;
        }
        let tags = match &detail {
            ElementDetail::ContainerInstance { container, .. } => {
                self.element_or_err(container)?.tags().clone()
            }
            _ => Tags::with_required(kind.required_tags()),
        };

        let id = ElementId::from(self.assign_id(preset_id)?);
        let element = Element::new(
            id.clone(),
            name.to_owned(),
            description.to_owned(),
            canonical_name,
            parent.cloned(),
            tags,
            detail,
        );

        match parent {
            Some(parent) => self.element_mut(parent)?.push_child(id.clone()),
            None => match kind {
                ElementKind::Person => self.people.push(id.clone()),
                ElementKind::SoftwareSystem => self.software_systems.push(id.clone()),
                ElementKind::DeploymentNode => self.deployment_nodes.push(id.clone()),
                _ => {}
            },
        }

        debug!(id:% = id, kind:% = kind, name; "Added element");
        trace!(element:? = element; "Element details");
        self.elements.insert(id.clone(), element);
        Ok(id)
    }

    /// Container instances are named after their container, so two instances
    /// on one node are told apart by instance number alone.
    fn ensure_unique_instance(
        &self,
        parent: Option<&ElementId>,
        canonical_name: &str,
    ) -> Result<(), ModelError> {
        let taken = parent.is_some_and(|parent| {
            self.children(parent)
                .any(|sibling| sibling.canonical_name() == canonical_name)
        });
        if taken {
            return Err(ModelError::InvalidArgument(format!(
                "container instance `{canonical_name}` already exists"
            )));
        }
        Ok(())
    }

    fn canonical_name_for(
        &self,
        parent: Option<&ElementId>,
        name: &str,
        detail: &ElementDetail,
    ) -> Result<String, ModelError> {
        match (parent, detail) {
            (None, ElementDetail::DeploymentNode { environment, .. }) => {
                Ok(format!("/Deployment/{environment}/{name}"))
            }
            (None, _) => Ok(format!("/{name}")),
            (
                Some(parent),
                ElementDetail::ContainerInstance {
                    container,
                    instance_id,
                    ..
                },
            ) => {
                let parent = self.element_or_err(parent)?;
                let container = self.element_or_err(container)?;
                Ok(format!(
                    "{}/{}[{}]",
                    parent.canonical_name(),
                    container.canonical_name().trim_start_matches('/'),
                    instance_id
                ))
            }
            (Some(parent), _) => Ok(format!(
                "{}/{}",
                self.element_or_err(parent)?.canonical_name(),
                name
            )),
        }
    }

    /// Fails if a sibling in the same containment scope already uses `name`.
    ///
    /// People and software systems share the top-level scope; top-level
    /// deployment nodes are scoped by environment.
    fn ensure_unique_name(
        &self,
        parent: Option<&ElementId>,
        name: &str,
        detail: &ElementDetail,
    ) -> Result<(), ModelError> {
        let siblings: Vec<&Element> = match (parent, detail) {
            (Some(parent), _) => self.children(parent).collect(),
            (None, ElementDetail::DeploymentNode { environment, .. }) => self
                .deployment_nodes()
                .filter(|node| node.environment() == Some(environment.as_str()))
                .collect(),
            (None, _) => self.people().chain(self.software_systems()).collect(),
        };

        let clash = siblings.iter().any(|sibling| {
            sibling.kind() != ElementKind::ContainerInstance && sibling.name() == name
        });
        if clash {
            return Err(ModelError::DuplicateName {
                kind: detail.kind(),
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Validates, constructs, and indexes a new relationship.
    fn create_relationship(
        &mut self,
        preset_id: Option<&str>,
        source: &ElementId,
        destination: &ElementId,
        description: &str,
        technology: Option<String>,
        interaction_style: InteractionStyle,
    ) -> Result<Option<RelationshipId>, ModelError> {
        self.element_or_err(source)?;
        self.element_or_err(destination)?;

        let duplicate = self.efferent_relationships(source).any(|relationship| {
            relationship.destination() == destination && relationship.description() == description
        });
        if duplicate {
            debug!(
                source:% = source,
                destination:% = destination,
                description;
                "Relationship already exists, skipping"
            );
            return Ok(None);
        }

        let id = RelationshipId::from(self.assign_id(preset_id)?);
        let relationship = Relationship::new(
            id.clone(),
            source.clone(),
            destination.clone(),
            description.to_owned(),
            technology,
            interaction_style,
        );
        self.element_mut(source)?.push_relationship(id.clone());

        debug!(id:% = id, source:% = source, destination:% = destination; "Added relationship");
        self.relationships.insert(id.clone(), relationship);
        Ok(Some(id))
    }
}

pub(crate) fn validate_instances(count: u32) -> Result<(), ModelError> {
    if count == 0 {
        return Err(ModelError::InvalidArgument(
            "the number of instances must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::InvalidArgument(
            "a name must be specified".to_string(),
        ));
    }
    if name.contains('/') {
        return Err(ModelError::InvalidArgument(format!(
            "element names cannot contain \"/\": `{name}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn shop() -> (Model, ElementId, ElementId, ElementId) {
        let mut model = Model::new();
        let system = model.add_software_system("Shop", "").unwrap();
        let web = model.add_container(&system, "Web", "", Some("Rust")).unwrap();
        let db = model.add_container(&system, "Database", "", Some("PostgreSQL")).unwrap();
        (model, system, web, db)
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        let system = model.add_software_system("Shop", "").unwrap();
        let relationship = model.uses(&user, &system, "Buys from", None).unwrap().unwrap();

        assert_eq!(user, "1");
        assert_eq!(system, "2");
        assert_eq!(relationship, "3");
    }

    #[test]
    fn test_canonical_names() {
        let (mut model, _, web, _) = shop();
        let component = model.add_component(&web, "Checkout", "", None).unwrap();
        let node = model.add_deployment_node(Some("Live"), "Server", "", None).unwrap();
        let child = model.add_child_deployment_node(&node, "Docker", "", None).unwrap();
        let lb = model.add_infrastructure_node(&node, "LB", "", None).unwrap();
        let instance = model.add_container_instance(&child, &web).unwrap();

        let name = |id: &ElementId| model.element(id).unwrap().canonical_name().to_string();
        assert_eq!(name(&component), "/Shop/Web/Checkout");
        assert_eq!(name(&child), "/Deployment/Live/Server/Docker");
        assert_eq!(name(&lb), "/Deployment/Live/Server/LB");
        assert_eq!(name(&instance), "/Deployment/Live/Server/Docker/Shop/Web[1]");
        assert_eq!(
            model.element_with_canonical_name("/Shop/Web/Checkout").map(Element::id),
            Some(&component)
        );
    }

    #[test]
    fn test_duplicate_names_rejected_in_scope() {
        let (mut model, system, _, _) = shop();

        let err = model.add_container(&system, "Web", "", None).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateName {
                kind: ElementKind::Container,
                name: "Web".to_string()
            }
        );
        assert!(model.add_person("Shop", "").is_err());

        let other = model.add_software_system("Warehouse", "").unwrap();
        assert!(model.add_container(&other, "Web", "", None).is_ok());
    }

    #[test]
    fn test_deployment_names_scoped_by_environment() {
        let mut model = Model::new();
        model.add_deployment_node(Some("Live"), "Server", "", None).unwrap();

        assert!(model.add_deployment_node(Some("Live"), "Server", "", None).is_err());
        assert!(model.add_deployment_node(Some("Staging"), "Server", "", None).is_ok());
        let default = model.add_deployment_node(None, "Server", "", None).unwrap();
        assert_eq!(
            model.element(&default).unwrap().environment(),
            Some(DEFAULT_ENVIRONMENT)
        );
    }

    #[test]
    fn test_failed_add_leaves_model_unchanged() {
        let (mut model, system, _, _) = shop();
        let before = model.elements().count();

        assert!(model.add_container(&system, "Web", "", None).is_err());
        assert!(model.add_container(&system, "", "", None).is_err());
        assert!(model.add_container(&system, "a/b", "", None).is_err());

        assert_eq!(model.elements().count(), before);
        assert_eq!(model.children(&system).count(), 2);
        // No id was consumed by the failures.
        assert_eq!(model.add_person("User", "").unwrap(), "4");
    }

    #[test]
    fn test_wrong_parent_kind() {
        let (mut model, system, web, _) = shop();

        let err = model.add_component(&system, "Checkout", "", None).unwrap_err();
        assert!(matches!(err, ModelError::WrongKind { .. }));
        assert!(model.add_container(&web, "Nested", "", None).is_err());
    }

    #[test]
    fn test_duplicate_relationship_is_noop() {
        let (mut model, _, web, db) = shop();

        let first = model.uses(&web, &db, "Reads from", Some("SQL")).unwrap();
        let second = model.uses(&web, &db, "Reads from", Some("JDBC")).unwrap();
        let third = model.uses(&web, &db, "Writes to", Some("SQL")).unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_some());
        assert_eq!(model.efferent_relationships(&web).count(), 2);
    }

    #[test]
    fn test_relationship_to_unknown_element() {
        let (mut model, _, web, _) = shop();

        let err = model
            .uses(&web, &ElementId::new("404"), "Calls", None)
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownElement(ElementId::new("404")));
    }

    #[test]
    fn test_container_instances_are_numbered_per_container() {
        let (mut model, _, web, db) = shop();
        let node = model.add_deployment_node(None, "Server", "", None).unwrap();
        let other = model.add_deployment_node(None, "Backup", "", None).unwrap();

        let web1 = model.add_container_instance(&node, &web).unwrap();
        let db1 = model.add_container_instance(&node, &db).unwrap();
        let web2 = model.add_container_instance(&other, &web).unwrap();

        let instance = |id: &ElementId| model.element(id).unwrap().instance_id();
        assert_eq!(instance(&web1), Some(1));
        assert_eq!(instance(&db1), Some(1));
        assert_eq!(instance(&web2), Some(2));
    }

    #[test]
    fn test_container_relationships_replicated_to_instances() {
        let (mut model, _, web, db) = shop();
        let link = model
            .add_relationship(&web, &db, "Reads from", Some("SQL"), Some(InteractionStyle::Asynchronous))
            .unwrap()
            .unwrap();
        let node = model.add_deployment_node(None, "Server", "", None).unwrap();

        let db1 = model.add_container_instance(&node, &db).unwrap();
        let web1 = model.add_container_instance(&node, &web).unwrap();

        let replicated: Vec<&Relationship> = model.efferent_relationships(&web1).collect();
        assert_eq!(replicated.len(), 1);
        assert_eq!(replicated[0].destination(), &db1);
        assert_eq!(replicated[0].description(), "Reads from");
        assert_eq!(replicated[0].technology(), Some("SQL"));
        assert_eq!(replicated[0].interaction_style(), InteractionStyle::Asynchronous);
        assert_eq!(replicated[0].linked_relationship(), Some(&link));
        assert_eq!(model.efferent_relationships(&db1).count(), 0);
    }

    #[test]
    fn test_container_instance_mirrors_container_tags() {
        let (mut model, _, web, _) = shop();
        model.add_tags(&web, &["Web Browser"]).unwrap();
        let node = model.add_deployment_node(None, "Server", "", None).unwrap();
        let instance = model.add_container_instance(&node, &web).unwrap();

        assert_eq!(
            model.element(&instance).unwrap().tags().to_string(),
            "Element,Container,Web Browser"
        );

        model.add_tags(&web, &["Public"]).unwrap();
        assert!(model.element(&instance).unwrap().tags().contains("Public"));
        assert!(model.remove_tag(&web, "Web Browser").unwrap());
        assert!(!model.element(&instance).unwrap().tags().contains("Web Browser"));

        assert_eq!(
            model.add_tags(&instance, &["Blue"]),
            Err(ModelError::InheritedTags(instance.clone()))
        );
    }

    #[test]
    fn test_set_instances_rejects_zero() {
        let mut model = Model::new();
        let node = model.add_deployment_node(None, "Server", "", None).unwrap();

        assert!(matches!(
            model.set_instances(&node, 0),
            Err(ModelError::InvalidArgument(_))
        ));
        model.set_instances(&node, 4).unwrap();
        assert!(matches!(
            model.element(&node).unwrap().detail(),
            ElementDetail::DeploymentNode { instances: 4, .. }
        ));
    }

    #[test]
    fn test_component_discovery_entry_points() {
        let (mut model, _, web, _) = shop();
        let controller = model
            .add_component_with_type(&web, "Orders", "shop::orders::Controller", "", Some("axum"))
            .unwrap();
        let repository = model.add_component(&web, "Repository", "", None).unwrap();

        model.add_supporting_type(&controller, "shop::orders::Form").unwrap();
        model.add_supporting_type(&controller, "shop::orders::Form").unwrap();
        model.uses(&controller, &repository, "Loads orders", None).unwrap();

        match model.element(&controller).unwrap().detail() {
            ElementDetail::Component {
                code_type,
                supporting_types,
                ..
            } => {
                assert_eq!(code_type.as_deref(), Some("shop::orders::Controller"));
                assert_eq!(supporting_types.len(), 1);
            }
            other => panic!("Expected component, got {other:?}"),
        }
        assert!(model.has_efferent_relationship_with(&controller, &repository));
    }

    #[test]
    fn test_ancestors_and_environments() {
        let (mut model, system, web, _) = shop();
        let component = model.add_component(&web, "Checkout", "", None).unwrap();
        model.add_deployment_node(Some("Live"), "A", "", None).unwrap();
        model.add_deployment_node(Some("Dev"), "B", "", None).unwrap();
        model.add_deployment_node(Some("Live"), "C", "", None).unwrap();

        let ancestors: Vec<&ElementId> = model.ancestors(&component).map(Element::id).collect();
        assert_eq!(ancestors, vec![&web, &system]);
        assert!(model.is_ancestor(&system, &component));
        assert!(!model.is_ancestor(&component, &system));
        assert_eq!(model.environments(), vec!["Live", "Dev"]);
    }

    proptest! {
        #[test]
        fn siblings_never_share_canonical_names(names in proptest::collection::vec("[a-c]{1,2}", 1..30)) {
            let mut model = Model::new();
            let system = model.add_software_system("System", "").unwrap();
            for name in &names {
                let _ = model.add_container(&system, name, "", None);
            }

            let mut seen = std::collections::HashSet::new();
            for child in model.children(&system) {
                prop_assert!(seen.insert(child.canonical_name().to_string()));
            }
            let distinct: std::collections::HashSet<&String> = names.iter().collect();
            prop_assert_eq!(seen.len(), distinct.len());
        }
    }
}
