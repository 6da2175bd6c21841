//! View projections over a model.
//!
//! A view is a named subset of a model's elements and relationships plus
//! layout metadata. Every view variant shares the bookkeeping in
//! [`ViewBase`] and the capability interface [`View`]; variants differ in
//! which elements they accept, expressed by [`View::check_element`], and in
//! the helpers they offer for populating themselves.
//!
//! # Relationship inclusion
//!
//! Adding an element with relationship inclusion enabled also adds every
//! relationship between the new element and elements already present, in
//! both directions. A relationship is only ever part of a view when both of
//! its endpoints are.
//!
//! # Organization
//!
//! - [`SystemLandscapeView`], [`SystemContextView`], [`ContainerView`],
//!   [`ComponentView`] - static views
//! - [`DeploymentView`] - deployment topology with animation steps
//! - [`DynamicView`] - ordered interactions, numbered by [`SequenceNumber`]
//! - [`layout`] - automatic layout parameters and vertices

mod component;
mod container;
mod context;
mod deployment;
mod dynamic;
mod landscape;
pub mod layout;
mod sequence;

pub use component::ComponentView;
pub use container::ContainerView;
pub use context::SystemContextView;
pub use deployment::{Animation, DeploymentView};
pub use dynamic::DynamicView;
pub use landscape::SystemLandscapeView;
pub use sequence::SequenceNumber;

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use archgraph_core::{
    ModelError,
    identifier::{ElementId, RelationshipId},
    model::{Element, ElementKind, Model},
};

use crate::error::ViewError;
use layout::{AutomaticLayout, Vertex};

/// The closed set of view variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    SystemLandscape,
    SystemContext,
    Container,
    Component,
    Deployment,
    Dynamic,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SystemLandscape => "system landscape",
            Self::SystemContext => "system context",
            Self::Container => "container",
            Self::Component => "component",
            Self::Deployment => "deployment",
            Self::Dynamic => "dynamic",
        };
        f.write_str(name)
    }
}

/// An element placed in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementView {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl ElementView {
    pub fn new(id: ElementId) -> Self {
        Self { id, x: None, y: None }
    }
}

/// A relationship placed in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    pub id: RelationshipId,
    /// Overrides the relationship's own description in this view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sequence label in dynamic views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Set when a dynamic view shows the relationship from destination to source.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub response: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Vertex>,
    /// Position of the description along the line, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl RelationshipView {
    pub fn new(id: RelationshipId) -> Self {
        Self {
            id,
            description: None,
            order: None,
            response: false,
            vertices: Vec::new(),
            position: None,
        }
    }
}

/// State shared by every view variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBase {
    key: String,
    title: Option<String>,
    description: String,
    elements: IndexMap<ElementId, ElementView>,
    relationships: Vec<RelationshipView>,
    automatic_layout: Option<AutomaticLayout>,
}

impl ViewBase {
    /// Creates an empty view base.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidArgument`] if `key` is blank.
    pub fn new(key: &str, description: &str) -> Result<Self, ViewError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ViewError::InvalidArgument(
                "a view key must be specified".to_string(),
            ));
        }
        Ok(Self {
            key: key.to_owned(),
            title: None,
            description: description.to_owned(),
            elements: IndexMap::new(),
            relationships: Vec::new(),
            automatic_layout: None,
        })
    }

    /// Unique key of the view within its view set.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_owned);
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Iterates over element views in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementView> {
        self.elements.values()
    }

    pub fn contains_element(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Returns the placement of an element, e.g. to record its position.
    pub fn element_view_mut(&mut self, id: &ElementId) -> Option<&mut ElementView> {
        self.elements.get_mut(id)
    }

    /// Returns relationship views in insertion order.
    pub fn relationships(&self) -> &[RelationshipView] {
        &self.relationships
    }

    pub fn contains_relationship(&self, id: &RelationshipId) -> bool {
        self.relationships.iter().any(|view| &view.id == id)
    }

    pub fn automatic_layout(&self) -> Option<&AutomaticLayout> {
        self.automatic_layout.as_ref()
    }

    pub fn set_automatic_layout(&mut self, layout: Option<AutomaticLayout>) {
        self.automatic_layout = layout;
    }

    /// Inserts an element, optionally pulling in its relationships with
    /// elements already present. Unknown elements are ignored.
    pub(crate) fn insert_element(
        &mut self,
        model: &Model,
        id: &ElementId,
        include_relationships: bool,
    ) {
        if !model.contains_element(id) {
            trace!(view = self.key.as_str(), element:% = id; "Ignoring unknown element");
            return;
        }
        if !self.elements.contains_key(id) {
            self.elements
                .insert(id.clone(), ElementView::new(id.clone()));
            debug!(view = self.key.as_str(), element:% = id; "Added element to view");
        }
        if !include_relationships {
            return;
        }

        let outgoing = model
            .efferent_relationships(id)
            .filter(|relationship| self.elements.contains_key(relationship.destination()));
        let incoming = self.elements.keys().flat_map(move |present| {
            model
                .efferent_relationships(present)
                .filter(move |relationship| relationship.destination() == id)
        });
        let related: Vec<RelationshipId> = outgoing
            .chain(incoming)
            .map(|relationship| relationship.id().clone())
            .collect();

        for relationship in related {
            self.insert_relationship(relationship);
        }
    }

    /// Removes an element and every relationship view touching it.
    pub(crate) fn remove_element(&mut self, model: &Model, id: &ElementId) -> bool {
        if self.elements.shift_remove(id).is_none() {
            return false;
        }
        self.relationships.retain(|view| {
            model.relationship(&view.id).is_none_or(|relationship| {
                relationship.source() != id && relationship.destination() != id
            })
        });
        true
    }

    /// Adds a relationship if both of its endpoints are present.
    ///
    /// Returns `false` if an endpoint is missing.
    pub(crate) fn add_relationship(
        &mut self,
        model: &Model,
        id: &RelationshipId,
    ) -> Result<bool, ViewError> {
        let relationship = model
            .relationship(id)
            .ok_or_else(|| ModelError::UnknownRelationship(id.clone()))?;
        if !self.elements.contains_key(relationship.source())
            || !self.elements.contains_key(relationship.destination())
        {
            return Ok(false);
        }
        self.insert_relationship(id.clone());
        Ok(true)
    }

    /// Inserts a relationship view unless one already exists.
    fn insert_relationship(&mut self, id: RelationshipId) {
        if !self.contains_relationship(&id) {
            trace!(view = self.key.as_str(), relationship:% = id; "Added relationship to view");
            self.relationships.push(RelationshipView::new(id));
        }
    }

    /// Appends a relationship view, allowing repeats of the same relationship.
    pub(crate) fn push_relationship_view(&mut self, view: RelationshipView) {
        self.relationships.push(view);
    }

    /// Replaces the contents of the view with persisted element and
    /// relationship views, resolving every id against `model`.
    pub(crate) fn restore(
        &mut self,
        model: &Model,
        title: Option<String>,
        elements: Vec<ElementView>,
        relationships: Vec<RelationshipView>,
        automatic_layout: Option<AutomaticLayout>,
    ) -> Result<(), ViewError> {
        for element in &elements {
            model.element_or_err(&element.id)?;
        }
        for relationship in &relationships {
            if model.relationship(&relationship.id).is_none() {
                return Err(ModelError::UnknownRelationship(relationship.id.clone()).into());
            }
        }

        self.title = title;
        self.elements = elements
            .into_iter()
            .map(|element| (element.id.clone(), element))
            .collect();
        self.relationships = relationships;
        self.automatic_layout = automatic_layout;
        Ok(())
    }
}

/// Builds the error for an element a view does not accept.
pub(crate) fn not_allowed(base: &ViewBase, element: &Element, reason: &str) -> ViewError {
    ViewError::ElementNotAllowed {
        element: element.id().clone(),
        view: base.key().to_owned(),
        reason: reason.to_owned(),
    }
}

/// Capability interface shared by every view variant.
pub trait View {
    fn base(&self) -> &ViewBase;

    fn base_mut(&mut self) -> &mut ViewBase;

    fn kind(&self) -> ViewKind;

    /// Checks whether `element` may be added to this view.
    fn check_element(&self, model: &Model, element: &Element) -> Result<(), ViewError>;

    fn key(&self) -> &str {
        self.base().key()
    }

    /// Adds an element, optionally with its relationships to elements
    /// already present. Adding an element that is not in the model is a
    /// no-op; adding one twice has no further effect.
    ///
    /// # Errors
    ///
    /// Returns the variant's error if [`View::check_element`] rejects the
    /// element.
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
        self.base_mut()
            .insert_element(model, id, include_relationships);
        Ok(())
    }

    /// Removes an element and every relationship touching it.
    fn remove_element(&mut self, model: &Model, id: &ElementId) -> bool {
        self.base_mut().remove_element(model, id)
    }

    /// Adds a relationship whose endpoints are both in the view.
    ///
    /// Returns `false` if an endpoint is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownRelationship`] if the relationship does
    /// not exist.
    fn add_relationship(&mut self, model: &Model, id: &RelationshipId) -> Result<bool, ViewError> {
        self.base_mut().add_relationship(model, id)
    }

    /// Adds an element and every element of `kind` directly connected to it
    /// in either direction. Neighbours the view does not accept are skipped.
    fn add_nearest_neighbours(
        &mut self,
        model: &Model,
        id: &ElementId,
        kind: ElementKind,
    ) -> Result<(), ViewError> {
        model.element_or_err(id)?;
        self.add_element(model, id, true)?;

        let mut neighbours: Vec<ElementId> = Vec::new();
        for relationship in model.relationships() {
            let neighbour = if relationship.source() == id {
                relationship.destination()
            } else if relationship.destination() == id {
                relationship.source()
            } else {
                continue;
            };
            let matches_kind = model
                .element(neighbour)
                .is_some_and(|element| element.kind() == kind);
            if matches_kind && !neighbours.contains(neighbour) {
                neighbours.push(neighbour.clone());
            }
        }

        for neighbour in neighbours {
            match self.add_element(model, &neighbour, true) {
                Ok(()) => {}
                Err(
                    err @ (ViewError::ElementNotAllowed { .. }
                    | ViewError::ScopeViolation { .. }
                    | ViewError::EnvironmentMismatch { .. }),
                ) => {
                    debug!(view = self.key(), element:% = neighbour, err:% = err; "Skipping neighbour");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn automatic_layout(&self) -> Option<&AutomaticLayout> {
        self.base().automatic_layout()
    }

    fn set_automatic_layout(&mut self, layout: Option<AutomaticLayout>) {
        self.base_mut().set_automatic_layout(layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Model, ElementId, ElementId, ElementId, RelationshipId) {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        let shop = model.add_software_system("Shop", "").unwrap();
        let bank = model.add_software_system("Bank", "").unwrap();
        let pays = model.uses(&shop, &bank, "Takes payments", None).unwrap().unwrap();
        model.uses(&user, &shop, "Buys", None).unwrap();
        (model, user, shop, bank, pays)
    }

    #[test]
    fn test_insert_element_pulls_relationships_both_ways() {
        let (model, user, shop, bank, _) = fixture();
        let mut base = ViewBase::new("landscape", "").unwrap();

        base.insert_element(&model, &shop, true);
        base.insert_element(&model, &bank, true);
        base.insert_element(&model, &user, true);

        assert_eq!(base.elements().count(), 3);
        assert_eq!(base.relationships().len(), 2);
    }

    #[test]
    fn test_insert_element_is_idempotent() {
        let (model, _, shop, bank, _) = fixture();
        let mut base = ViewBase::new("landscape", "").unwrap();

        base.insert_element(&model, &shop, true);
        base.insert_element(&model, &bank, true);
        base.insert_element(&model, &bank, true);

        assert_eq!(base.elements().count(), 2);
        assert_eq!(base.relationships().len(), 1);
    }

    #[test]
    fn test_unknown_element_is_ignored() {
        let (model, ..) = fixture();
        let mut base = ViewBase::new("landscape", "").unwrap();

        base.insert_element(&model, &ElementId::new("404"), true);

        assert_eq!(base.elements().count(), 0);
    }

    #[test]
    fn test_add_relationship_requires_both_endpoints() {
        let (model, _, shop, bank, pays) = fixture();
        let mut base = ViewBase::new("landscape", "").unwrap();
        base.insert_element(&model, &shop, false);

        assert!(!base.add_relationship(&model, &pays).unwrap());

        base.insert_element(&model, &bank, false);
        assert!(base.add_relationship(&model, &pays).unwrap());
        assert!(base.add_relationship(&model, &pays).unwrap());
        assert_eq!(base.relationships().len(), 1);

        let err = base
            .add_relationship(&model, &RelationshipId::new("404"))
            .unwrap_err();
        assert_eq!(
            err,
            ViewError::Model(ModelError::UnknownRelationship(RelationshipId::new("404")))
        );
    }

    #[test]
    fn test_remove_element_drops_touching_relationships() {
        let (model, user, shop, bank, _) = fixture();
        let mut base = ViewBase::new("landscape", "").unwrap();
        for id in [&user, &shop, &bank] {
            base.insert_element(&model, id, true);
        }

        assert!(base.remove_element(&model, &shop));
        assert!(!base.remove_element(&model, &shop));

        assert_eq!(base.elements().count(), 2);
        assert!(base.relationships().is_empty());
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            ViewBase::new("  ", ""),
            Err(ViewError::InvalidArgument(_))
        ));
    }
}
