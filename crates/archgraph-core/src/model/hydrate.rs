//! Reconstruction of a model from its record tree, and the reverse.
//!
//! Hydration runs in two passes. The first creates every element in
//! containment order, keeping the persisted identifiers, and collects the
//! relationship records it meets along the way. The second resolves and
//! creates those relationships once every element is indexed, so a
//! relationship may point at an element that appears later in the tree.

use log::{debug, info, warn};

use crate::{
    error::ModelError,
    identifier::{ElementId, RelationshipId},
    model::{Element, ElementDetail, ElementKind, Model, validate_instances},
    record::{
        ComponentRecord, ContainerInstanceRecord, ContainerRecord, DeploymentNodeRecord,
        ElementRecord, EnterpriseRecord, InfrastructureNodeRecord, ModelRecord, PersonRecord,
        RelationshipRecord, SoftwareSystemRecord,
    },
};

/// A relationship record waiting for the second pass, with the element it
/// was stored on.
type Pending<'a> = (ElementId, &'a RelationshipRecord);

impl Model {
    /// Rebuilds a model from persisted records.
    ///
    /// # Errors
    ///
    /// Fails with [`ModelError::UnknownElement`] if a container instance or
    /// relationship refers to an element that does not exist, and with
    /// [`ModelError::DuplicateId`] if an identifier is used twice. A
    /// deployment node with no instances, or two instances of one container
    /// sharing a node and an instance number, fail with
    /// [`ModelError::InvalidArgument`]. A record
    /// that repeats a relationship triple is skipped with a warning.
    pub fn hydrate(record: &ModelRecord) -> Result<Self, ModelError> {
        let mut model = Self::new();
        if let Some(enterprise) = &record.enterprise {
            model.set_enterprise(&enterprise.name)?;
        }

        let mut pending = Vec::new();
        for person in &record.people {
            model.hydrate_person(person, &mut pending)?;
        }
        for system in &record.software_systems {
            model.hydrate_software_system(system, &mut pending)?;
        }
        for node in &record.deployment_nodes {
            model.hydrate_deployment_node(None, node, &mut pending)?;
        }
        debug!(elements = model.elements.len(); "Hydrated elements");

        model.hydrate_relationships(&pending)?;

        info!(
            elements = model.elements.len(),
            relationships = model.relationships.len();
            "Model hydrated"
        );
        Ok(model)
    }

    fn hydrate_person<'a>(
        &mut self,
        record: &'a PersonRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let detail = ElementDetail::Person {
            location: record.location,
        };
        self.hydrate_element(None, &record.element, detail, pending)?;
        Ok(())
    }

    fn hydrate_software_system<'a>(
        &mut self,
        record: &'a SoftwareSystemRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let detail = ElementDetail::SoftwareSystem {
            location: record.location,
        };
        let system = self.hydrate_element(None, &record.element, detail, pending)?;
        for container in &record.containers {
            self.hydrate_container(&system, container, pending)?;
        }
        Ok(())
    }

    fn hydrate_container<'a>(
        &mut self,
        system: &ElementId,
        record: &'a ContainerRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let detail = ElementDetail::Container {
            technology: record.technology.clone(),
        };
        let container = self.hydrate_element(Some(system), &record.element, detail, pending)?;
        for component in &record.components {
            self.hydrate_component(&container, component, pending)?;
        }
        Ok(())
    }

    fn hydrate_component<'a>(
        &mut self,
        container: &ElementId,
        record: &'a ComponentRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let detail = ElementDetail::Component {
            technology: record.technology.clone(),
            code_type: record.code_type.clone(),
            supporting_types: record.supporting_types.iter().cloned().collect(),
            size: record.size,
        };
        self.hydrate_element(Some(container), &record.element, detail, pending)?;
        Ok(())
    }

    fn hydrate_deployment_node<'a>(
        &mut self,
        parent: Option<&ElementId>,
        record: &'a DeploymentNodeRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let environment = match parent {
            Some(parent) => self.node_environment(parent)?,
            None => record.environment.clone(),
        };
        validate_instances(record.instances)?;
        let detail = ElementDetail::DeploymentNode {
            environment,
            technology: record.technology.clone(),
            instances: record.instances,
        };
        let node = self.hydrate_element(parent, &record.element, detail, pending)?;

        for child in &record.children {
            self.hydrate_deployment_node(Some(&node), child, pending)?;
        }
        for infrastructure in &record.infrastructure_nodes {
            self.hydrate_infrastructure_node(&node, infrastructure, pending)?;
        }
        for instance in &record.container_instances {
            self.hydrate_container_instance(&node, instance, pending)?;
        }
        Ok(())
    }

    fn hydrate_infrastructure_node<'a>(
        &mut self,
        node: &ElementId,
        record: &'a InfrastructureNodeRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let detail = ElementDetail::InfrastructureNode {
            environment: self.node_environment(node)?,
            technology: record.technology.clone(),
        };
        self.hydrate_element(Some(node), &record.element, detail, pending)?;
        Ok(())
    }

    /// Restores a container instance without replicating relationships; the
    /// replicated relationships are part of the records already.
    fn hydrate_container_instance<'a>(
        &mut self,
        node: &ElementId,
        record: &'a ContainerInstanceRecord,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<(), ModelError> {
        let container = ElementId::from(record.container_id.as_str());
        let name = self
            .expect_kind(&container, ElementKind::Container)?
            .name()
            .to_owned();
        let instance_id = match record.instance_id {
            0 => self.container_instances_of(&container).count() as u32 + 1,
            instance_id => instance_id,
        };
        let detail = ElementDetail::ContainerInstance {
            container,
            instance_id,
            environment: self.node_environment(node)?,
            health_checks: record.health_checks.clone(),
        };

        let id = self.create_element(Some(&record.id), Some(node), &name, "", detail)?;
        let element = self.element_mut(&id)?;
        element.set_url(record.url.clone());
        element.properties_mut().extend(record.properties.clone());
        pending.extend(record.relationships.iter().map(|r| (id.clone(), r)));
        Ok(())
    }

    /// Creates one element from its shared record fields.
    fn hydrate_element<'a>(
        &mut self,
        parent: Option<&ElementId>,
        record: &'a ElementRecord,
        detail: ElementDetail,
        pending: &mut Vec<Pending<'a>>,
    ) -> Result<ElementId, ModelError> {
        let id = self.create_element(
            Some(&record.id),
            parent,
            &record.name,
            &record.description,
            detail,
        )?;
        let element = self.element_mut(&id)?;
        element.tags_mut().add_all(&record.tags);
        element.set_url(record.url.clone());
        element.properties_mut().extend(record.properties.clone());
        pending.extend(record.relationships.iter().map(|r| (id.clone(), r)));
        Ok(id)
    }

    /// Second pass: creates every collected relationship.
    fn hydrate_relationships(&mut self, pending: &[Pending<'_>]) -> Result<(), ModelError> {
        let mut links = Vec::new();

        for (owner, record) in pending {
            let source = match record.source_id.as_str() {
                "" => owner.clone(),
                source => ElementId::from(source),
            };
            let destination = ElementId::from(record.destination_id.as_str());

            let created = self.create_relationship(
                Some(&record.id),
                &source,
                &destination,
                &record.description,
                record.technology.clone(),
                record.interaction_style,
            )?;
            let Some(id) = created else {
                warn!(id = record.id.as_str(), source:% = source, destination:% = destination;
                    "Skipping duplicate relationship record");
                continue;
            };

            let relationship = self.relationship_mut(&id)?;
            relationship.tags_mut().add_all(&record.tags);
            relationship.set_url(record.url.clone());
            relationship
                .properties_mut()
                .extend(record.properties.clone());
            if let Some(linked) = &record.linked_relationship_id {
                links.push((id, RelationshipId::from(linked.as_str())));
            }
        }

        for (id, linked) in links {
            if !self.relationships.contains_key(&linked) {
                return Err(ModelError::UnknownRelationship(linked));
            }
            self.relationship_mut(&id)?
                .set_linked_relationship(Some(linked));
        }
        Ok(())
    }

    /// Writes the model back to its record tree.
    pub fn to_record(&self) -> ModelRecord {
        ModelRecord {
            enterprise: self.enterprise.as_ref().map(|name| EnterpriseRecord {
                name: name.clone(),
            }),
            people: self
                .people()
                .map(|person| PersonRecord {
                    element: self.element_record(person),
                    location: person.location().unwrap_or_default(),
                })
                .collect(),
            software_systems: self
                .software_systems()
                .map(|system| SoftwareSystemRecord {
                    element: self.element_record(system),
                    location: system.location().unwrap_or_default(),
                    containers: self
                        .children(system.id())
                        .map(|container| self.container_record(container))
                        .collect(),
                })
                .collect(),
            deployment_nodes: self
                .deployment_nodes()
                .map(|node| self.deployment_node_record(node))
                .collect(),
        }
    }

    fn container_record(&self, container: &Element) -> ContainerRecord {
        ContainerRecord {
            element: self.element_record(container),
            technology: container.technology().map(str::to_owned),
            components: self
                .children(container.id())
                .map(|component| {
                    let (code_type, supporting_types, size) = match component.detail() {
                        ElementDetail::Component {
                            code_type,
                            supporting_types,
                            size,
                            ..
                        } => (
                            code_type.clone(),
                            supporting_types.iter().cloned().collect(),
                            *size,
                        ),
                        _ => (None, Vec::new(), 0),
                    };
                    ComponentRecord {
                        element: self.element_record(component),
                        technology: component.technology().map(str::to_owned),
                        code_type,
                        supporting_types,
                        size,
                    }
                })
                .collect(),
        }
    }

    fn deployment_node_record(&self, node: &Element) -> DeploymentNodeRecord {
        let instances = match node.detail() {
            ElementDetail::DeploymentNode { instances, .. } => *instances,
            _ => 1,
        };
        let mut record = DeploymentNodeRecord {
            element: self.element_record(node),
            environment: node.environment().unwrap_or_default().to_owned(),
            technology: node.technology().map(str::to_owned),
            instances,
            children: Vec::new(),
            infrastructure_nodes: Vec::new(),
            container_instances: Vec::new(),
        };

        for child in self.children(node.id()) {
            match child.detail() {
                ElementDetail::DeploymentNode { .. } => {
                    record.children.push(self.deployment_node_record(child));
                }
                ElementDetail::InfrastructureNode { environment, technology } => {
                    record.infrastructure_nodes.push(InfrastructureNodeRecord {
                        element: self.element_record(child),
                        environment: environment.clone(),
                        technology: technology.clone(),
                    });
                }
                ElementDetail::ContainerInstance {
                    container,
                    instance_id,
                    environment,
                    health_checks,
                } => {
                    record.container_instances.push(ContainerInstanceRecord {
                        id: child.id().to_string(),
                        container_id: container.to_string(),
                        instance_id: *instance_id,
                        environment: environment.clone(),
                        url: child.url().map(str::to_owned),
                        properties: child.properties().clone(),
                        relationships: self.relationship_records(child),
                        health_checks: health_checks.clone(),
                    });
                }
                _ => {}
            }
        }
        record
    }

    fn element_record(&self, element: &Element) -> ElementRecord {
        ElementRecord {
            id: element.id().to_string(),
            name: element.name().to_owned(),
            description: element.description().to_owned(),
            tags: element.tags().to_string(),
            url: element.url().map(str::to_owned),
            properties: element.properties().clone(),
            relationships: self.relationship_records(element),
        }
    }

    fn relationship_records(&self, element: &Element) -> Vec<RelationshipRecord> {
        self.efferent_relationships(element.id())
            .map(|relationship| RelationshipRecord {
                id: relationship.id().to_string(),
                source_id: relationship.source().to_string(),
                destination_id: relationship.destination().to_string(),
                description: relationship.description().to_owned(),
                technology: relationship.technology().map(str::to_owned),
                interaction_style: relationship.interaction_style(),
                tags: relationship.tags().to_string(),
                url: relationship.url().map(str::to_owned),
                properties: relationship.properties().clone(),
                linked_relationship_id: relationship
                    .linked_relationship()
                    .map(ToString::to_string),
            })
            .collect()
    }
}
