//! The system landscape view: people and software systems of an enterprise.

use archgraph_core::model::{Element, ElementKind, Model};

use crate::{
    error::ViewError,
    view::{View, ViewBase, ViewKind, not_allowed},
};

/// Shows people and software systems, with the enterprise boundary of the
/// model when one is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemLandscapeView {
    base: ViewBase,
    enterprise_boundary_visible: bool,
}

impl SystemLandscapeView {
    pub fn new(key: &str, description: &str) -> Result<Self, ViewError> {
        Ok(Self {
            base: ViewBase::new(key, description)?,
            enterprise_boundary_visible: true,
        })
    }

    pub fn enterprise_boundary_visible(&self) -> bool {
        self.enterprise_boundary_visible
    }

    pub fn set_enterprise_boundary_visible(&mut self, visible: bool) {
        self.enterprise_boundary_visible = visible;
    }

    pub fn add_all_people(&mut self, model: &Model) -> Result<(), ViewError> {
        let people: Vec<_> = model.people().map(|e| e.id().clone()).collect();
        for person in &people {
            self.add_element(model, person, true)?;
        }
        Ok(())
    }

    pub fn add_all_software_systems(&mut self, model: &Model) -> Result<(), ViewError> {
        let systems: Vec<_> = model.software_systems().map(|e| e.id().clone()).collect();
        for system in &systems {
            self.add_element(model, system, true)?;
        }
        Ok(())
    }

    /// Adds every person and software system in the model.
    pub fn add_all_elements(&mut self, model: &Model) -> Result<(), ViewError> {
        self.add_all_people(model)?;
        self.add_all_software_systems(model)
    }
}

impl View for SystemLandscapeView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::SystemLandscape
    }

    fn check_element(&self, _model: &Model, element: &Element) -> Result<(), ViewError> {
        match element.kind() {
            ElementKind::Person | ElementKind::SoftwareSystem => Ok(()),
            _ => Err(not_allowed(
                &self.base,
                element,
                "only people and software systems can be added to a system landscape view",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_all_elements() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        let shop = model.add_software_system("Shop", "").unwrap();
        let web = model.add_container(&shop, "Web", "", None).unwrap();
        model.uses(&user, &shop, "Buys", None).unwrap();
        model.uses(&user, &web, "Browses", None).unwrap();

        let mut view = SystemLandscapeView::new("landscape", "").unwrap();
        view.add_all_elements(&model).unwrap();

        assert_eq!(view.base().elements().count(), 2);
        assert_eq!(view.base().relationships().len(), 1);
        assert!(matches!(
            view.add_element(&model, &web, true),
            Err(ViewError::ElementNotAllowed { .. })
        ));
    }
}
