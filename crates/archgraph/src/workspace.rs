//! A named model together with its views.

use log::{debug, info};

use archgraph_core::model::Model;

use crate::{error::ArchgraphError, record::WorkspaceDocument, view_set::ViewSet};

/// The unit that is loaded, derived and written back: one model and the
/// views projected from it.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    name: String,
    description: String,
    model: Model,
    views: ViewSet,
}

impl Workspace {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            model: Model::new(),
            views: ViewSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewSet {
        &mut self.views
    }

    /// Borrows the model and the views at the same time, so views can be
    /// populated from the model they belong to.
    ///
    /// # Examples
    ///
    /// ```
    /// use archgraph::Workspace;
    ///
    /// let mut workspace = Workspace::new("Shop", "");
    /// let shop = workspace.model_mut().add_software_system("Shop", "").unwrap();
    ///
    /// let (model, views) = workspace.split_mut();
    /// views.create_container_view(model, &shop, "containers", "").unwrap();
    /// ```
    pub fn split_mut(&mut self) -> (&Model, &mut ViewSet) {
        (&self.model, &mut self.views)
    }

    /// Rebuilds a workspace from its document, the model first and then the
    /// views against it.
    pub fn hydrate(document: &WorkspaceDocument) -> Result<Self, ArchgraphError> {
        let model = Model::hydrate(&document.model)?;
        debug!(elements = model.elements().count(); "Model hydrated");
        let views = ViewSet::hydrate(&document.views, &model)?;
        Ok(Self {
            name: document.name.clone(),
            description: document.description.clone(),
            model,
            views,
        })
    }

    pub fn to_document(&self) -> WorkspaceDocument {
        WorkspaceDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            model: self.model.to_record(),
            views: self.views.to_record(),
        }
    }

    /// Parses and hydrates a JSON workspace document.
    ///
    /// # Errors
    ///
    /// Returns [`ArchgraphError::Document`] carrying `source` when the text is
    /// not a valid document, or a model or view error when it references
    /// unknown elements.
    pub fn from_json(source: &str) -> Result<Self, ArchgraphError> {
        let document: WorkspaceDocument = serde_json::from_str(source)
            .map_err(|err| ArchgraphError::new_document_error(err, source))?;
        info!(name = document.name.as_str(); "Loading workspace");
        Self::hydrate(&document)
    }

    pub fn to_json(&self) -> Result<String, ArchgraphError> {
        serde_json::to_string_pretty(&self.to_document())
            .map_err(|err| ArchgraphError::new_document_error(err, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut workspace = Workspace::new("Shop", "Online shop");
        let model = workspace.model_mut();
        let user = model.add_person("User", "").unwrap();
        let shop = model.add_software_system("Shop", "").unwrap();
        model.uses(&user, &shop, "Buys", None).unwrap();
        let (model, views) = workspace.split_mut();
        views
            .create_system_context_view(model, &shop, "context", "")
            .unwrap()
            .add_all_elements(model)
            .unwrap();

        let json = workspace.to_json().unwrap();
        let restored = Workspace::from_json(&json).unwrap();

        assert_eq!(restored.name(), "Shop");
        assert_eq!(restored.description(), "Online shop");
        assert_eq!(restored.to_document(), workspace.to_document());
    }

    #[test]
    fn test_invalid_json_keeps_source() {
        let source = "{\n  \"name\": 3\n}";

        let err = Workspace::from_json(source).unwrap_err();

        match err {
            ArchgraphError::Document { err, src } => {
                assert_eq!(src, source);
                assert_eq!(err.line(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
