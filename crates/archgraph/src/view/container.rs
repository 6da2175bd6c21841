//! The container view: the containers inside one software system.

use archgraph_core::{
    identifier::ElementId,
    model::{Element, ElementKind, Model},
};

use crate::{
    error::ViewError,
    view::{View, ViewBase, ViewKind, not_allowed},
};

/// Shows the containers of a software system along with the people, other
/// software systems and containers they interact with. The software system
/// in scope is drawn as a boundary and never appears as an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerView {
    base: ViewBase,
    software_system: ElementId,
}

impl ContainerView {
    pub fn new(
        model: &Model,
        software_system: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<Self, ViewError> {
        model.expect_kind(software_system, ElementKind::SoftwareSystem)?;
        Ok(Self {
            base: ViewBase::new(key, description)?,
            software_system: software_system.clone(),
        })
    }

    /// The software system in scope.
    pub fn software_system(&self) -> &ElementId {
        &self.software_system
    }

    /// Adds every container of the software system in scope.
    pub fn add_all_containers(&mut self, model: &Model) -> Result<(), ViewError> {
        let containers: Vec<ElementId> = model
            .children(&self.software_system)
            .map(|element| element.id().clone())
            .collect();
        self.add_all(model, &containers)
    }

    pub fn add_all_people(&mut self, model: &Model) -> Result<(), ViewError> {
        let people: Vec<ElementId> = model.people().map(|e| e.id().clone()).collect();
        self.add_all(model, &people)
    }

    /// Adds every software system except the one in scope.
    pub fn add_all_software_systems(&mut self, model: &Model) -> Result<(), ViewError> {
        let systems: Vec<ElementId> = model
            .software_systems()
            .map(|e| e.id().clone())
            .filter(|id| id != &self.software_system)
            .collect();
        self.add_all(model, &systems)
    }

    /// Adds the containers in scope, then every person and other software system.
    pub fn add_all_elements(&mut self, model: &Model) -> Result<(), ViewError> {
        self.add_all_containers(model)?;
        self.add_all_people(model)?;
        self.add_all_software_systems(model)
    }

    /// Adds the containers in scope and every element directly related to them.
    pub fn add_all_containers_and_influencers(&mut self, model: &Model) -> Result<(), ViewError> {
        self.add_all_containers(model)?;
        let containers: Vec<ElementId> = model
            .children(&self.software_system)
            .map(|element| element.id().clone())
            .collect();
        for container in &containers {
            for kind in [
                ElementKind::Person,
                ElementKind::SoftwareSystem,
                ElementKind::Container,
            ] {
                self.add_nearest_neighbours(model, container, kind)?;
            }
        }
        Ok(())
    }

    fn add_all(&mut self, model: &Model, ids: &[ElementId]) -> Result<(), ViewError> {
        for id in ids {
            self.add_element(model, id, true)?;
        }
        Ok(())
    }
}

impl View for ContainerView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Container
    }

    fn check_element(&self, _model: &Model, element: &Element) -> Result<(), ViewError> {
        match element.kind() {
            ElementKind::SoftwareSystem if element.id() == &self.software_system => {
                Err(not_allowed(
                    &self.base,
                    element,
                    "the software system in scope is shown as a boundary",
                ))
            }
            ElementKind::Person | ElementKind::SoftwareSystem | ElementKind::Container => Ok(()),
            _ => Err(not_allowed(
                &self.base,
                element,
                "only people, software systems and containers can be added to a container view",
            )),
        }
    }
}
