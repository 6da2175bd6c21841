//! The collection of views of one workspace.

use log::{debug, info};

use archgraph_core::{
    identifier::ElementId,
    model::{ElementKind, Model},
};

use crate::{
    error::ViewError,
    record::{ViewRecord, ViewSetRecord},
    view::{
        ComponentView, ContainerView, DeploymentView, DynamicView, SystemContextView,
        SystemLandscapeView, View, ViewKind,
    },
};

/// Owns every view of a workspace and keeps their keys unique.
///
/// # Examples
///
/// ```
/// use archgraph::{ViewSet, model::Model};
///
/// let mut model = Model::new();
/// let shop = model.add_software_system("Shop", "").unwrap();
///
/// let mut views = ViewSet::new();
/// views.create_system_context_view(&model, &shop, "context", "").unwrap();
///
/// assert!(views.view("context").is_some());
/// assert!(views.create_system_landscape_view("context", "").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSet {
    system_landscape_views: Vec<SystemLandscapeView>,
    system_context_views: Vec<SystemContextView>,
    container_views: Vec<ContainerView>,
    component_views: Vec<ComponentView>,
    deployment_views: Vec<DeploymentView>,
    dynamic_views: Vec<DynamicView>,
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    pub fn create_system_landscape_view(
        &mut self,
        key: &str,
        description: &str,
    ) -> Result<&mut SystemLandscapeView, ViewError> {
        self.ensure_key_available(key)?;
        let view = SystemLandscapeView::new(key, description)?;
        Ok(push(&mut self.system_landscape_views, view))
    }

    pub fn create_system_context_view(
        &mut self,
        model: &Model,
        software_system: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut SystemContextView, ViewError> {
        self.ensure_key_available(key)?;
        let view = SystemContextView::new(model, software_system, key, description)?;
        Ok(push(&mut self.system_context_views, view))
    }

    pub fn create_container_view(
        &mut self,
        model: &Model,
        software_system: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut ContainerView, ViewError> {
        self.ensure_key_available(key)?;
        let view = ContainerView::new(model, software_system, key, description)?;
        Ok(push(&mut self.container_views, view))
    }

    pub fn create_component_view(
        &mut self,
        model: &Model,
        container: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut ComponentView, ViewError> {
        self.ensure_key_available(key)?;
        let view = ComponentView::new(model, container, key, description)?;
        Ok(push(&mut self.component_views, view))
    }

    pub fn create_deployment_view(
        &mut self,
        model: &Model,
        software_system: Option<&ElementId>,
        environment: Option<&str>,
        key: &str,
        description: &str,
    ) -> Result<&mut DeploymentView, ViewError> {
        self.ensure_key_available(key)?;
        let view = DeploymentView::new(model, software_system, environment, key, description)?;
        Ok(push(&mut self.deployment_views, view))
    }

    pub fn create_dynamic_view(
        &mut self,
        model: &Model,
        scope: Option<&ElementId>,
        key: &str,
        description: &str,
    ) -> Result<&mut DynamicView, ViewError> {
        self.ensure_key_available(key)?;
        let view = DynamicView::new(model, scope, key, description)?;
        Ok(push(&mut self.dynamic_views, view))
    }

    fn ensure_key_available(&self, key: &str) -> Result<(), ViewError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ViewError::InvalidArgument(
                "a view key must be specified".to_string(),
            ));
        }
        if self.view(key).is_some() {
            return Err(ViewError::DuplicateKey(key.to_owned()));
        }
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Iterates over every view, grouped by kind.
    pub fn views(&self) -> impl Iterator<Item = &dyn View> {
        self.system_landscape_views
            .iter()
            .map(|view| view as &dyn View)
            .chain(self.system_context_views.iter().map(|view| view as &dyn View))
            .chain(self.container_views.iter().map(|view| view as &dyn View))
            .chain(self.component_views.iter().map(|view| view as &dyn View))
            .chain(self.deployment_views.iter().map(|view| view as &dyn View))
            .chain(self.dynamic_views.iter().map(|view| view as &dyn View))
    }

    pub fn views_mut(&mut self) -> impl Iterator<Item = &mut dyn View> {
        self.system_landscape_views
            .iter_mut()
            .map(|view| view as &mut dyn View)
            .chain(self.system_context_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.container_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.component_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.deployment_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.dynamic_views.iter_mut().map(|view| view as &mut dyn View))
    }

    /// Looks up a view by key.
    pub fn view(&self, key: &str) -> Option<&dyn View> {
        self.views().find(|view| view.key() == key)
    }

    pub fn view_mut(&mut self, key: &str) -> Option<&mut dyn View> {
        self.views_mut().find(|view| view.key() == key)
    }

    pub fn len(&self) -> usize {
        self.views().count()
    }

    pub fn is_empty(&self) -> bool {
        self.views().next().is_none()
    }

    pub fn system_landscape_views(&self) -> &[SystemLandscapeView] {
        &self.system_landscape_views
    }

    pub fn system_context_views(&self) -> &[SystemContextView] {
        &self.system_context_views
    }

    pub fn container_views(&self) -> &[ContainerView] {
        &self.container_views
    }

    pub fn component_views(&self) -> &[ComponentView] {
        &self.component_views
    }

    pub fn deployment_views(&self) -> &[DeploymentView] {
        &self.deployment_views
    }

    pub fn dynamic_views(&self) -> &[DynamicView] {
        &self.dynamic_views
    }

    pub fn deployment_view_mut(&mut self, key: &str) -> Option<&mut DeploymentView> {
        self.deployment_views
            .iter_mut()
            .find(|view| view.key() == key)
    }

    pub fn dynamic_view_mut(&mut self, key: &str) -> Option<&mut DynamicView> {
        self.dynamic_views.iter_mut().find(|view| view.key() == key)
    }

    // =========================================================================
    // Default views
    // =========================================================================

    /// Creates a standard set of views for `model`.
    ///
    /// That is a landscape with every person and software system; for each
    /// software system a context view, a container view when it has
    /// containers, and a deployment view per environment its containers are
    /// deployed to; and a component view for each container with components.
    /// Views whose key is already taken are left alone.
    ///
    /// Returns the keys of the created views.
    pub fn create_default_views(&mut self, model: &Model) -> Result<Vec<String>, ViewError> {
        let mut created = Vec::new();

        let key = "SystemLandscape".to_string();
        if self.is_free(&key) {
            self.create_system_landscape_view(&key, "")?
                .add_all_elements(model)?;
            created.push(key);
        }

        let systems: Vec<(ElementId, String)> = model
            .software_systems()
            .map(|system| (system.id().clone(), system.name().to_owned()))
            .collect();
        for (system, name) in &systems {
            let key = format!("{name}-SystemContext");
            if self.is_free(&key) {
                self.create_system_context_view(model, system, &key, "")?
                    .add_nearest_neighbours_of_scope(model)?;
                created.push(key);
            }

            let containers: Vec<(ElementId, String)> = model
                .children(system)
                .map(|container| (container.id().clone(), container.name().to_owned()))
                .collect();
            if containers.is_empty() {
                continue;
            }

            let key = format!("{name}-Container");
            if self.is_free(&key) {
                self.create_container_view(model, system, &key, "")?
                    .add_all_containers_and_influencers(model)?;
                created.push(key);
            }

            for (container, container_name) in &containers {
                if model.children(container).next().is_none() {
                    continue;
                }
                let key = format!("{name}-{container_name}-Component");
                if self.is_free(&key) {
                    let view = self.create_component_view(model, container, &key, "")?;
                    view.add_all_components(model)?;
                    let components: Vec<ElementId> =
                        model.children(container).map(|c| c.id().clone()).collect();
                    for component in &components {
                        for kind in [
                            ElementKind::Person,
                            ElementKind::SoftwareSystem,
                            ElementKind::Container,
                        ] {
                            view.add_nearest_neighbours(model, component, kind)?;
                        }
                    }
                    created.push(key);
                }
            }

            for environment in deployed_environments(model, &containers) {
                let key = format!("{name}-{environment}-Deployment");
                if self.is_free(&key) {
                    self.create_deployment_view(model, Some(system), Some(environment.as_str()), &key, "")?
                        .add_all_deployment_nodes(model)?;
                    created.push(key);
                }
            }
        }

        info!(count = created.len(); "Created default views");
        Ok(created)
    }

    fn is_free(&self, key: &str) -> bool {
        let free = self.view(key).is_none();
        if !free {
            debug!(key; "View key already taken, skipping default view");
        }
        free
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Writes every view to its persisted record.
    pub fn to_record(&self) -> ViewSetRecord {
        let mut views = Vec::new();
        for view in &self.system_landscape_views {
            let mut record = base_record(view, None);
            record.enterprise_boundary_visible = Some(view.enterprise_boundary_visible());
            views.push(record);
        }
        for view in &self.system_context_views {
            let mut record = base_record(view, Some(view.software_system()));
            record.enterprise_boundary_visible = Some(view.enterprise_boundary_visible());
            views.push(record);
        }
        for view in &self.container_views {
            views.push(base_record(view, Some(view.software_system())));
        }
        for view in &self.component_views {
            views.push(base_record(view, Some(view.container())));
        }
        for view in &self.deployment_views {
            let mut record = base_record(view, view.software_system());
            record.environment = Some(view.environment().to_owned());
            record.animations = view.animations().to_vec();
            views.push(record);
        }
        for view in &self.dynamic_views {
            views.push(base_record(view, view.scope()));
        }
        ViewSetRecord { views }
    }

    /// Rebuilds views from their records, resolving every id against an
    /// already hydrated `model`.
    pub fn hydrate(record: &ViewSetRecord, model: &Model) -> Result<Self, ViewError> {
        let mut views = Self::new();
        for view in &record.views {
            views.hydrate_view(view, model)?;
        }
        debug!(views = views.len(); "Hydrated views");
        Ok(views)
    }

    fn hydrate_view(&mut self, record: &ViewRecord, model: &Model) -> Result<(), ViewError> {
        let scope = record.scope_id.as_deref().map(ElementId::from);
        let required_scope = || {
            scope.clone().ok_or_else(|| {
                ViewError::InvalidArgument(format!(
                    "{} view `{}` needs a scope",
                    record.kind, record.key
                ))
            })
        };
        let key = record.key.as_str();
        let description = record.description.as_str();

        let view: &mut dyn View = match record.kind {
            ViewKind::SystemLandscape => {
                let view = self.create_system_landscape_view(key, description)?;
                view.set_enterprise_boundary_visible(record.enterprise_boundary_visible.unwrap_or(true));
                view
            }
            ViewKind::SystemContext => {
                let view = self.create_system_context_view(model, &required_scope()?, key, description)?;
                view.set_enterprise_boundary_visible(record.enterprise_boundary_visible.unwrap_or(true));
                view
            }
            ViewKind::Container => {
                self.create_container_view(model, &required_scope()?, key, description)?
            }
            ViewKind::Component => {
                self.create_component_view(model, &required_scope()?, key, description)?
            }
            ViewKind::Deployment => {
                let view = self.create_deployment_view(
                    model,
                    scope.as_ref(),
                    record.environment.as_deref(),
                    key,
                    description,
                )?;
                view.restore_animations(model, record.animations.clone())?;
                view
            }
            ViewKind::Dynamic => self.create_dynamic_view(model, scope.as_ref(), key, description)?,
        };

        view.base_mut().restore(
            model,
            record.title.clone(),
            record.elements.clone(),
            record.relationships.clone(),
            record.automatic_layout,
        )
    }
}

/// Pushes `view` and returns a reference to it.
fn push<T>(views: &mut Vec<T>, view: T) -> &mut T {
    views.push(view);
    let last = views.len() - 1;
    &mut views[last]
}

fn base_record(view: &dyn View, scope: Option<&ElementId>) -> ViewRecord {
    let base = view.base();
    ViewRecord {
        key: base.key().to_owned(),
        kind: view.kind(),
        title: base.title().map(str::to_owned),
        description: base.description().to_owned(),
        scope_id: scope.map(ToString::to_string),
        environment: None,
        enterprise_boundary_visible: None,
        elements: base.elements().cloned().collect(),
        relationships: base.relationships().to_vec(),
        automatic_layout: base.automatic_layout().copied(),
        animations: Vec::new(),
    }
}

/// Environments in which any of `containers` has an instance, in model order.
fn deployed_environments(model: &Model, containers: &[(ElementId, String)]) -> Vec<String> {
    model
        .environments()
        .into_iter()
        .filter(|environment| {
            containers.iter().any(|(container, _)| {
                model
                    .container_instances_of(container)
                    .any(|instance| instance.environment() == Some(*environment))
            })
        })
        .map(str::to_owned)
        .collect()
}
