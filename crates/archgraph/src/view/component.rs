//! The component view: the components inside one container.

use archgraph_core::{
    identifier::ElementId,
    model::{Element, ElementKind, Model},
};

use crate::{
    error::ViewError,
    view::{View, ViewBase, ViewKind, not_allowed},
};

/// Shows the components of a container along with the people, software
/// systems, containers and components they interact with. Neither the
/// container in scope nor its software system appear as elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentView {
    base: ViewBase,
    container: ElementId,
    software_system: ElementId,
}

impl ComponentView {
    pub fn new(
        model: &Model,
        container: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<Self, ViewError> {
        let software_system = model
            .expect_kind(container, ElementKind::Container)?
            .parent()
            .cloned()
            .ok_or_else(|| {
                ViewError::InvalidArgument(format!("container `{container}` has no software system"))
            })?;
        Ok(Self {
            base: ViewBase::new(key, description)?,
            container: container.clone(),
            software_system,
        })
    }

    /// The container in scope.
    pub fn container(&self) -> &ElementId {
        &self.container
    }

    /// The software system containing the container in scope.
    pub fn software_system(&self) -> &ElementId {
        &self.software_system
    }

    /// Adds every component of the container in scope.
    pub fn add_all_components(&mut self, model: &Model) -> Result<(), ViewError> {
        let components: Vec<ElementId> = model
            .children(&self.container)
            .map(|element| element.id().clone())
            .collect();
        self.add_all(model, &components)
    }

    /// Adds the other containers of the software system in scope.
    pub fn add_all_containers(&mut self, model: &Model) -> Result<(), ViewError> {
        let containers: Vec<ElementId> = model
            .children(&self.software_system)
            .map(|element| element.id().clone())
            .filter(|id| id != &self.container)
            .collect();
        self.add_all(model, &containers)
    }

    pub fn add_all_people(&mut self, model: &Model) -> Result<(), ViewError> {
        let people: Vec<ElementId> = model.people().map(|e| e.id().clone()).collect();
        self.add_all(model, &people)
    }

    /// Adds every software system except the one containing the scope.
    pub fn add_all_software_systems(&mut self, model: &Model) -> Result<(), ViewError> {
        let systems: Vec<ElementId> = model
            .software_systems()
            .map(|e| e.id().clone())
            .filter(|id| id != &self.software_system)
            .collect();
        self.add_all(model, &systems)
    }

    pub fn add_all_elements(&mut self, model: &Model) -> Result<(), ViewError> {
        self.add_all_components(model)?;
        self.add_all_containers(model)?;
        self.add_all_people(model)?;
        self.add_all_software_systems(model)
    }

    fn add_all(&mut self, model: &Model, ids: &[ElementId]) -> Result<(), ViewError> {
        for id in ids {
            self.add_element(model, id, true)?;
        }
        Ok(())
    }
}

impl View for ComponentView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Component
    }

    fn check_element(&self, _model: &Model, element: &Element) -> Result<(), ViewError> {
        if element.id() == &self.container || element.id() == &self.software_system {
            return Err(not_allowed(
                &self.base,
                element,
                "the container in scope and its software system are shown as boundaries",
            ));
        }
        match element.kind() {
            ElementKind::Person
            | ElementKind::SoftwareSystem
            | ElementKind::Container
            | ElementKind::Component => Ok(()),
            _ => Err(not_allowed(
                &self.base,
                element,
                "deployment elements cannot be added to a component view",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_all_elements_excludes_scope() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        let shop = model.add_software_system("Shop", "").unwrap();
        let web = model.add_container(&shop, "Web", "", None).unwrap();
        let db = model.add_container(&shop, "Database", "", None).unwrap();
        let orders = model.add_component(&web, "Orders", "", None).unwrap();
        let basket = model.add_component(&web, "Basket", "", None).unwrap();
        model.uses(&orders, &db, "Stores", None).unwrap();
        model.uses(&basket, &orders, "Places", None).unwrap();
        model.uses(&user, &basket, "Fills", None).unwrap();

        let mut view = ComponentView::new(&model, &web, "components", "").unwrap();
        view.add_all_elements(&model).unwrap();

        assert_eq!(view.software_system(), &shop);
        for id in [&user, &db, &orders, &basket] {
            assert!(view.base().contains_element(id));
        }
        assert!(!view.base().contains_element(&web));
        assert!(!view.base().contains_element(&shop));
        assert_eq!(view.base().relationships().len(), 3);
        assert!(view.add_element(&model, &web, true).is_err());
    }
}
