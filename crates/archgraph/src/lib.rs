//! Archgraph - Architecture models and the views projected from them.
//!
//! A workspace holds one model of people, software systems, containers,
//! components and deployment nodes, and a set of views over it: landscape,
//! context, container, component, deployment and dynamic views. This crate
//! provides the views, the sequence numbering of dynamic views, the view set
//! and the JSON workspace document, on top of the model in `archgraph-core`.

pub mod config;
pub mod record;
pub mod view;

mod error;
mod view_set;
mod workspace;

pub use archgraph_core::{ModelError, identifier, model};

pub use error::{ArchgraphError, ScopeRule, ViewError};
pub use view_set::ViewSet;
pub use workspace::Workspace;

use log::{debug, info, trace};

use config::AppConfig;
use identifier::RelationshipId;
use view::View;

/// Builder for loading and deriving archgraph workspaces.
///
/// Loading parses a workspace document and then applies the derivations the
/// configuration enables: implied relationships, default views and
/// automatic layout.
///
/// # Examples
///
/// ```rust
/// use archgraph::{WorkspaceBuilder, config::AppConfig};
///
/// let source = r#"{
///     "name": "Shop",
///     "model": {"softwareSystems": [{"id": "1", "name": "Shop"}]}
/// }"#;
///
/// let builder = WorkspaceBuilder::new(AppConfig::default());
/// let workspace = builder.load(source).expect("Failed to load");
/// assert!(workspace.views().view("Shop-SystemContext").is_some());
///
/// let json = builder.render_json(&workspace).expect("Failed to render");
/// assert!(json.contains("Shop-SystemContext"));
/// ```
/// What [`WorkspaceBuilder::derive`] added to a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    /// Relationships implied by relationships between nested elements.
    pub implied_relationships: Vec<RelationshipId>,
    /// Keys of the views created because the workspace had none.
    pub default_views: Vec<String>,
    /// Keys of the views that received the configured automatic layout.
    pub laid_out_views: Vec<String>,
}

impl Derivation {
    /// Returns `true` if the derivations left the workspace unchanged.
    pub fn is_empty(&self) -> bool {
        self.implied_relationships.is_empty()
            && self.default_views.is_empty()
            && self.laid_out_views.is_empty()
    }
}

#[derive(Default)]
pub struct WorkspaceBuilder {
    config: AppConfig,
}

impl WorkspaceBuilder {
    /// Create a new workspace builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse a JSON workspace document and apply the configured derivations.
    ///
    /// # Errors
    ///
    /// Returns `ArchgraphError` for malformed documents, documents that
    /// reference unknown elements or relationships, and invalid layout
    /// configuration.
    pub fn load(&self, source: &str) -> Result<Workspace, ArchgraphError> {
        let mut workspace = Workspace::from_json(source)?;
        self.derive(&mut workspace)?;
        trace!(workspace:?; "Derived workspace");
        Ok(workspace)
    }

    /// Apply the configured derivations to a workspace built in code and
    /// report what they added.
    pub fn derive(&self, workspace: &mut Workspace) -> Result<Derivation, ArchgraphError> {
        let mut derivation = Derivation::default();

        if self.config.model().implied_relationships() {
            derivation.implied_relationships = workspace.model_mut().add_implicit_relationships()?;
            info!(count = derivation.implied_relationships.len(); "Added implied relationships");
        }

        let (model, views) = workspace.split_mut();
        if self.config.views().default_views() && views.is_empty() {
            derivation.default_views = views.create_default_views(model)?;
        }

        if let Some(layout) = self.config.views().automatic_layout() {
            let layout = layout.to_layout()?;
            for view in views.views_mut() {
                if view.automatic_layout().is_none() {
                    debug!(key = view.key(); "Applying automatic layout");
                    view.set_automatic_layout(Some(layout));
                    derivation.laid_out_views.push(view.key().to_owned());
                }
            }
        }

        info!(
            elements = workspace.model().elements().count(),
            relationships = workspace.model().relationships().count(),
            views = workspace.views().len();
            "Workspace derived"
        );
        Ok(derivation)
    }

    /// Render a workspace to its JSON document.
    pub fn render_json(&self, workspace: &Workspace) -> Result<String, ArchgraphError> {
        let json = workspace.to_json()?;
        debug!(bytes = json.len(); "Workspace rendered");
        Ok(json)
    }
}
