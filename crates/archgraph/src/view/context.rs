//! The system context view: one software system and its surroundings.

use archgraph_core::{
    identifier::ElementId,
    model::{Element, ElementKind, Model},
};

use crate::{
    error::ViewError,
    view::{View, ViewBase, ViewKind, not_allowed},
};

#[derive(Debug, Clone, PartialEq)]
pub struct SystemContextView {
    base: ViewBase,
    software_system: ElementId,
    enterprise_boundary_visible: bool,
}

impl SystemContextView {
    /// Creates a view of `software_system`, which is added immediately.
    ///
    /// # Errors
    ///
    /// Fails if `software_system` is not a software system of `model`.
    pub fn new(
        model: &Model,
        software_system: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<Self, ViewError> {
        model.expect_kind(software_system, ElementKind::SoftwareSystem)?;
        let mut view = Self {
            base: ViewBase::new(key, description)?,
            software_system: software_system.clone(),
            enterprise_boundary_visible: true,
        };
        view.base.insert_element(model, software_system, true);
        Ok(view)
    }

    /// The software system in scope.
    pub fn software_system(&self) -> &ElementId {
        &self.software_system
    }

    pub fn enterprise_boundary_visible(&self) -> bool {
        self.enterprise_boundary_visible
    }

    pub fn set_enterprise_boundary_visible(&mut self, visible: bool) {
        self.enterprise_boundary_visible = visible;
    }

    /// Adds every person and software system in the model.
    pub fn add_all_elements(&mut self, model: &Model) -> Result<(), ViewError> {
        let ids: Vec<ElementId> = model
            .people()
            .chain(model.software_systems())
            .map(|element| element.id().clone())
            .collect();
        for id in &ids {
            self.add_element(model, id, true)?;
        }
        Ok(())
    }

    /// Adds the people and software systems directly related to the scope.
    pub fn add_nearest_neighbours_of_scope(&mut self, model: &Model) -> Result<(), ViewError> {
        let scope = self.software_system.clone();
        self.add_nearest_neighbours(model, &scope, ElementKind::Person)?;
        self.add_nearest_neighbours(model, &scope, ElementKind::SoftwareSystem)
    }
}

impl View for SystemContextView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::SystemContext
    }

    fn check_element(&self, _model: &Model, element: &Element) -> Result<(), ViewError> {
        match element.kind() {
            ElementKind::Person | ElementKind::SoftwareSystem => Ok(()),
            _ => Err(not_allowed(
                &self.base,
                element,
                "only people and software systems can be added to a system context view",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_added_on_creation() {
        let mut model = Model::new();
        let shop = model.add_software_system("Shop", "").unwrap();
        let bank = model.add_software_system("Bank", "").unwrap();
        let user = model.add_person("User", "").unwrap();
        let other = model.add_software_system("Unrelated", "").unwrap();
        model.uses(&shop, &bank, "Takes payments", None).unwrap();
        model.uses(&user, &shop, "Buys", None).unwrap();

        let mut view = SystemContextView::new(&model, &shop, "context", "").unwrap();
        assert!(view.base().contains_element(&shop));

        view.add_nearest_neighbours_of_scope(&model).unwrap();

        assert!(view.base().contains_element(&bank));
        assert!(view.base().contains_element(&user));
        assert!(!view.base().contains_element(&other));
        assert_eq!(view.base().relationships().len(), 2);
    }

    #[test]
    fn test_scope_must_be_software_system() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();

        assert!(matches!(
            SystemContextView::new(&model, &user, "context", ""),
            Err(ViewError::Model(_))
        ));
    }
}
