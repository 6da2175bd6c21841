//! The deployment view: how containers map onto infrastructure in one
//! deployment environment.

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use archgraph_core::{
    ModelError,
    identifier::{ElementId, RelationshipId},
    model::{DEFAULT_ENVIRONMENT, Element, ElementKind, Model},
};

use crate::{
    error::ViewError,
    view::{View, ViewBase, ViewKind, not_allowed},
};

/// One step of a deployment view animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// 1-based position of the step.
    pub order: u32,
    pub elements: IndexSet<ElementId>,
    pub relationships: IndexSet<RelationshipId>,
}

/// Shows the deployment nodes, infrastructure nodes and container instances
/// of one environment, optionally restricted to the instances of one
/// software system's containers.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentView {
    base: ViewBase,
    software_system: Option<ElementId>,
    environment: String,
    animations: Vec<Animation>,
}

impl DeploymentView {
    /// Creates a deployment view of `environment`, or of the default
    /// environment when none is given.
    pub fn new(
        model: &Model,
        software_system: Option<&ElementId>,
        environment: Option<&str>,
        key: &str,
        description: &str,
    ) -> Result<Self, ViewError> {
        if let Some(system) = software_system {
            model.expect_kind(system, ElementKind::SoftwareSystem)?;
        }
        let environment = environment
            .map(str::trim)
            .filter(|environment| !environment.is_empty())
            .unwrap_or(DEFAULT_ENVIRONMENT);
        Ok(Self {
            base: ViewBase::new(key, description)?,
            software_system: software_system.cloned(),
            environment: environment.to_owned(),
            animations: Vec::new(),
        })
    }

    /// The software system in scope, if any.
    pub fn software_system(&self) -> Option<&ElementId> {
        self.software_system.as_ref()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Animation steps in order.
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Adds every top-level deployment node of this view's environment.
    pub fn add_all_deployment_nodes(&mut self, model: &Model) -> Result<(), ViewError> {
        let roots: Vec<ElementId> = model
            .deployment_nodes()
            .filter(|node| node.environment() == Some(self.environment.as_str()))
            .map(|node| node.id().clone())
            .collect();
        for root in &roots {
            self.add_deployment_node(model, root)?;
        }
        Ok(())
    }

    /// Adds a deployment node with the parts of its subtree that hold
    /// something to show.
    ///
    /// A node is included only if its subtree contains an infrastructure node
    /// or a container instance in scope. When anything is included, the
    /// node's ancestors are added too, without their relationships.
    ///
    /// # Errors
    ///
    /// Fails if `node` is not a deployment node, or belongs to another
    /// environment.
    pub fn add_deployment_node(&mut self, model: &Model, node: &ElementId) -> Result<(), ViewError> {
        let element = model.expect_kind(node, ElementKind::DeploymentNode)?;
        self.check_environment(element)?;

        if self.add_populated_subtree(model, node) {
            self.insert_ancestors(model, node);
        } else {
            debug!(view = self.base.key(), node:% = node; "Deployment node has nothing in scope");
        }
        Ok(())
    }

    /// Adds the deployment nodes containing `id`, without their relationships.
    fn insert_ancestors(&mut self, model: &Model, id: &ElementId) {
        let ancestors: Vec<ElementId> = model
            .ancestors(id)
            .map(|ancestor| ancestor.id().clone())
            .collect();
        for ancestor in &ancestors {
            self.base.insert_element(model, ancestor, false);
        }
    }

    /// Returns `true` if anything below `node` was added.
    fn add_populated_subtree(&mut self, model: &Model, node: &ElementId) -> bool {
        let children: Vec<(ElementId, ElementKind)> = model
            .children(node)
            .map(|child| (child.id().clone(), child.kind()))
            .collect();

        let mut populated = false;
        for (child, kind) in &children {
            match kind {
                ElementKind::ContainerInstance if self.instance_in_scope(model, child) => {
                    self.base.insert_element(model, child, true);
                    populated = true;
                }
                ElementKind::InfrastructureNode => {
                    self.base.insert_element(model, child, true);
                    populated = true;
                }
                ElementKind::DeploymentNode => {
                    populated |= self.add_populated_subtree(model, child);
                }
                _ => {}
            }
        }

        if populated {
            self.base.insert_element(model, node, false);
        }
        populated
    }

    fn instance_in_scope(&self, model: &Model, instance: &ElementId) -> bool {
        let Some(system) = &self.software_system else {
            return true;
        };
        model
            .element(instance)
            .and_then(Element::container)
            .and_then(|container| model.parent(container))
            .is_some_and(|parent| parent.id() == system)
    }

    /// Removes a deployment node and everything below it.
    pub fn remove_deployment_node(&mut self, model: &Model, node: &ElementId) {
        let children: Vec<ElementId> = model
            .children(node)
            .map(|child| child.id().clone())
            .collect();
        for child in &children {
            self.remove_deployment_node(model, child);
        }
        self.base.remove_element(model, node);
    }

    /// Adds an animation step showing the given elements, in addition to
    /// everything shown by earlier steps.
    ///
    /// Elements not in the view, or already shown by an earlier step, are
    /// skipped. The deployment nodes containing each new element are shown
    /// with it unless an earlier step showed them. The step includes every
    /// relationship in the view between an element of this step and an
    /// element shown by this or an earlier step.
    ///
    /// Returns the order of the new step.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::EmptyAnimationStep`] if no element is new.
    pub fn add_animation(&mut self, model: &Model, elements: &[ElementId]) -> Result<u32, ViewError> {
        let mut shown: IndexSet<ElementId> = self
            .animations
            .iter()
            .flat_map(|animation| animation.elements.iter().cloned())
            .collect();
        let mut step: IndexSet<ElementId> = IndexSet::new();

        for id in elements {
            if !self.base.contains_element(id) || shown.contains(id) {
                continue;
            }
            shown.insert(id.clone());
            step.insert(id.clone());

            for ancestor in model.ancestors(id) {
                if ancestor.kind() == ElementKind::DeploymentNode && shown.insert(ancestor.id().clone()) {
                    step.insert(ancestor.id().clone());
                }
            }
        }

        if step.is_empty() {
            return Err(ViewError::EmptyAnimationStep);
        }

        let earlier: IndexSet<&RelationshipId> = self
            .animations
            .iter()
            .flat_map(|animation| animation.relationships.iter())
            .collect();
        let relationships: IndexSet<RelationshipId> = self
            .base
            .relationships()
            .iter()
            .filter(|view| !earlier.contains(&view.id))
            .filter_map(|view| model.relationship(&view.id))
            .filter(|relationship| {
                let (source, destination) = (relationship.source(), relationship.destination());
                (step.contains(source) && shown.contains(destination))
                    || (shown.contains(source) && step.contains(destination))
            })
            .map(|relationship| relationship.id().clone())
            .collect();

        let order = self.animations.len() as u32 + 1;
        debug!(
            view = self.base.key(),
            order,
            elements = step.len(),
            relationships = relationships.len();
            "Added animation step"
        );
        self.animations.push(Animation {
            order,
            elements: step,
            relationships,
        });
        Ok(order)
    }

    pub(crate) fn restore_animations(
        &mut self,
        model: &Model,
        animations: Vec<Animation>,
    ) -> Result<(), ViewError> {
        for animation in &animations {
            for element in &animation.elements {
                model.element_or_err(element)?;
            }
            for relationship in &animation.relationships {
                if model.relationship(relationship).is_none() {
                    return Err(ModelError::UnknownRelationship(relationship.clone()).into());
                }
            }
        }
        self.animations = animations;
        Ok(())
    }

    fn check_environment(&self, element: &Element) -> Result<(), ViewError> {
        match element.environment() {
            Some(environment) if environment != self.environment => {
                Err(ViewError::EnvironmentMismatch {
                    element: element.id().clone(),
                    expected: self.environment.clone(),
                    actual: environment.to_owned(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl View for DeploymentView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Deployment
    }

    fn check_element(&self, model: &Model, element: &Element) -> Result<(), ViewError> {
        if !element.kind().is_deployment() {
            return Err(not_allowed(
                &self.base,
                element,
                "only deployment elements can be added to a deployment view",
            ));
        }
        if element.kind() == ElementKind::ContainerInstance
            && !self.instance_in_scope(model, element.id())
        {
            return Err(not_allowed(
                &self.base,
                element,
                "the container instance belongs to another software system",
            ));
        }
        self.check_environment(element)
    }

    /// Deployment nodes go through [`DeploymentView::add_deployment_node`], so
    /// a node with nothing in scope below it is never shown. Instances and
    /// infrastructure nodes bring their containing nodes with them.
    fn add_element(
        &mut self,
        model: &Model,
        id: &ElementId,
        include_relationships: bool,
    ) -> Result<(), ViewError> {
        let Some(element) = model.element(id) else {
            return Ok(());
        };
        self.check_element(model, element)?;
        if element.kind() == ElementKind::DeploymentNode {
            return self.add_deployment_node(model, id);
        }
        self.base.insert_element(model, id, include_relationships);
        self.insert_ancestors(model, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Topology {
        model: Model,
        region: ElementId,
        server: ElementId,
        empty: ElementId,
        web_instance: ElementId,
        db_instance: ElementId,
        lb: ElementId,
    }

    /// Live/Region/{Server/{web, db}, Empty/Nested, LB}
    fn topology() -> Topology {
        let mut model = Model::new();
        let shop = model.add_software_system("Shop", "").unwrap();
        let web = model.add_container(&shop, "Web", "", None).unwrap();
        let db = model.add_container(&shop, "Database", "", None).unwrap();
        model.uses(&web, &db, "Reads", None).unwrap();

        let region = model.add_deployment_node(Some("Live"), "Region", "", None).unwrap();
        let server = model.add_child_deployment_node(&region, "Server", "", None).unwrap();
        let empty = model.add_child_deployment_node(&region, "Empty", "", None).unwrap();
        model.add_child_deployment_node(&empty, "Nested", "", None).unwrap();
        let lb = model.add_infrastructure_node(&region, "LB", "", None).unwrap();
        let db_instance = model.add_container_instance(&server, &db).unwrap();
        let web_instance = model.add_container_instance(&server, &web).unwrap();
        model.uses(&lb, &web_instance, "Forwards", None).unwrap();

        Topology {
            model,
            region,
            server,
            empty,
            web_instance,
            db_instance,
            lb,
        }
    }

    #[test]
    fn test_empty_subtrees_pruned() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();

        view.add_all_deployment_nodes(&t.model).unwrap();

        for id in [&t.region, &t.server, &t.web_instance, &t.db_instance, &t.lb] {
            assert!(view.base().contains_element(id), "missing {id}");
        }
        assert!(!view.base().contains_element(&t.empty));
        assert_eq!(view.base().elements().count(), 5);
        assert_eq!(view.base().relationships().len(), 2);
    }

    #[test]
    fn test_child_node_backfills_ancestors() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();

        view.add_deployment_node(&t.model, &t.server).unwrap();

        assert!(view.base().contains_element(&t.region));
        assert!(!view.base().contains_element(&t.lb));
    }

    #[test]
    fn test_explicit_empty_node_is_not_shown() {
        let t = topology();
        let nested = t
            .model
            .children(&t.empty)
            .map(|child| child.id().clone())
            .next()
            .unwrap();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();

        view.add_element(&t.model, &nested, true).unwrap();
        view.add_element(&t.model, &t.empty, true).unwrap();

        assert_eq!(view.base().elements().count(), 0);
    }

    #[test]
    fn test_added_instance_backfills_ancestors() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();

        view.add_element(&t.model, &t.web_instance, true).unwrap();
        view.add_element(&t.model, &t.lb, true).unwrap();

        let ids: Vec<&ElementId> = view.base().elements().map(|element| &element.id).collect();
        assert_eq!(ids, vec![&t.web_instance, &t.server, &t.region, &t.lb]);
        assert_eq!(view.base().relationships().len(), 1);
        assert!(!view.base().contains_element(&t.db_instance));
    }

    #[test]
    fn test_nearest_neighbours_keep_pruning() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();

        view.add_nearest_neighbours(&t.model, &t.lb, ElementKind::ContainerInstance)
            .unwrap();

        for id in [&t.lb, &t.web_instance, &t.server, &t.region] {
            assert!(view.base().contains_element(id), "missing {id}");
        }
        assert!(!view.base().contains_element(&t.empty));
    }

    #[test]
    fn test_out_of_scope_instance_rejected() {
        let mut t = topology();
        let other = t.model.add_software_system("Other", "").unwrap();
        let worker = t.model.add_container(&other, "Worker", "", None).unwrap();
        let server = t.server.clone();
        let worker_instance = t.model.add_container_instance(&server, &worker).unwrap();

        let shop = t.model.software_system_with_name("Shop").unwrap().id().clone();
        let mut view =
            DeploymentView::new(&t.model, Some(&shop), Some("Live"), "live", "").unwrap();

        assert!(matches!(
            view.add_element(&t.model, &worker_instance, true),
            Err(ViewError::ElementNotAllowed { .. })
        ));
        assert_eq!(view.base().elements().count(), 0);
    }

    #[test]
    fn test_restore_animations_checks_relationships() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();
        let animation = Animation {
            order: 1,
            elements: IndexSet::from([t.lb.clone()]),
            relationships: IndexSet::from([RelationshipId::new("404")]),
        };

        assert_eq!(
            view.restore_animations(&t.model, vec![animation]),
            Err(ViewError::Model(ModelError::UnknownRelationship(
                RelationshipId::new("404")
            )))
        );
        assert!(view.animations().is_empty());
    }

    #[test]
    fn test_environment_mismatch() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, None, "default", "").unwrap();

        assert!(matches!(
            view.add_deployment_node(&t.model, &t.region),
            Err(ViewError::EnvironmentMismatch { .. })
        ));
        view.add_all_deployment_nodes(&t.model).unwrap();
        assert_eq!(view.base().elements().count(), 0);
    }

    #[test]
    fn test_software_system_scope_filters_instances() {
        let mut t = topology();
        let other = t.model.add_software_system("Other", "").unwrap();
        let worker = t.model.add_container(&other, "Worker", "", None).unwrap();
        let empty = t.empty.clone();
        let worker_instance = t.model.add_container_instance(&empty, &worker).unwrap();

        let shop = t.model.software_system_with_name("Shop").unwrap().id().clone();
        let mut view =
            DeploymentView::new(&t.model, Some(&shop), Some("Live"), "live", "").unwrap();
        view.add_all_deployment_nodes(&t.model).unwrap();

        assert!(view.base().contains_element(&t.web_instance));
        assert!(!view.base().contains_element(&worker_instance));
        assert!(!view.base().contains_element(&t.empty));
    }

    #[test]
    fn test_remove_deployment_node_removes_subtree() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();
        view.add_all_deployment_nodes(&t.model).unwrap();

        view.remove_deployment_node(&t.model, &t.server);

        assert!(!view.base().contains_element(&t.web_instance));
        assert!(view.base().contains_element(&t.lb));
        assert_eq!(view.base().relationships().len(), 0);
    }

    #[test]
    fn test_animation_steps_are_disjoint() {
        let t = topology();
        let mut view = DeploymentView::new(&t.model, None, Some("Live"), "live", "").unwrap();
        view.add_all_deployment_nodes(&t.model).unwrap();

        let first = view.add_animation(&t.model, &[t.lb.clone()]).unwrap();
        let second = view
            .add_animation(&t.model, &[t.web_instance.clone(), t.lb.clone()])
            .unwrap();
        let third = view.add_animation(&t.model, &[t.db_instance.clone()]).unwrap();

        assert_eq!((first, second, third), (1, 2, 3));
        let steps = view.animations();
        assert_eq!(
            steps[0].elements.iter().collect::<Vec<_>>(),
            vec![&t.lb, &t.region]
        );
        assert_eq!(
            steps[1].elements.iter().collect::<Vec<_>>(),
            vec![&t.web_instance, &t.server]
        );
        assert_eq!(steps[1].relationships.len(), 1);
        assert_eq!(steps[2].relationships.len(), 1);

        let mut seen = IndexSet::new();
        for step in steps {
            for element in &step.elements {
                assert!(seen.insert(element.clone()));
            }
        }

        assert_eq!(
            view.add_animation(&t.model, &[t.lb.clone()]),
            Err(ViewError::EmptyAnimationStep)
        );
    }
}
