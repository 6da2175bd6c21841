//! The dynamic view: an ordered sequence of interactions.

use log::debug;

use archgraph_core::{
    ModelError,
    identifier::{ElementId, RelationshipId},
    model::{Element, ElementKind, Model, Relationship},
};

use crate::{
    error::{ScopeRule, ViewError},
    view::{RelationshipView, SequenceNumber, View, ViewBase, ViewKind},
};

/// Shows how elements collaborate at runtime, as numbered interactions.
///
/// The scope decides which elements may take part:
///
/// - no scope: people and software systems
/// - a software system: people, other software systems and its own containers
/// - a container: people, software systems, containers other than the scope
///   and its own components
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicView {
    base: ViewBase,
    scope: Option<ElementId>,
    sequence: SequenceNumber,
}

impl DynamicView {
    /// Creates a dynamic view scoped to a software system, a container, or
    /// nothing.
    pub fn new(
        model: &Model,
        scope: Option<&ElementId>,
        key: &str,
        description: &str,
    ) -> Result<Self, ViewError> {
        if let Some(scope) = scope {
            let element = model.element_or_err(scope)?;
            if !matches!(
                element.kind(),
                ElementKind::SoftwareSystem | ElementKind::Container
            ) {
                return Err(ViewError::InvalidArgument(format!(
                    "a dynamic view can only be scoped to a software system or a container, got {element}"
                )));
            }
        }
        Ok(Self {
            base: ViewBase::new(key, description)?,
            scope: scope.cloned(),
            sequence: SequenceNumber::new(),
        })
    }

    /// The software system or container in scope, if any.
    pub fn scope(&self) -> Option<&ElementId> {
        self.scope.as_ref()
    }

    /// Adds the next interaction between two elements.
    ///
    /// The interaction uses the relationship from `source` to `destination`,
    /// preferring one whose description (and technology, when given)
    /// matches. Failing that it uses a relationship from `destination` to
    /// `source` and marks the interaction as a response. `description`
    /// overrides the relationship's own description in this view.
    ///
    /// Returns the label of the interaction.
    ///
    /// # Errors
    ///
    /// Fails if either element violates the scope, or if no relationship
    /// connects the two elements.
    pub fn add_interaction(
        &mut self,
        model: &Model,
        source: &ElementId,
        destination: &ElementId,
        description: Option<&str>,
        technology: Option<&str>,
    ) -> Result<String, ViewError> {
        self.check_element(model, model.element_or_err(source)?)?;
        self.check_element(model, model.element_or_err(destination)?)?;

        let (relationship, response) =
            match find_relationship(model, source, destination, description, technology) {
                Some(relationship) => (relationship.id().clone(), false),
                None => match find_relationship(model, destination, source, description, technology) {
                    Some(relationship) => (relationship.id().clone(), true),
                    None => {
                        return Err(ViewError::MissingRelationship {
                            from: source.clone(),
                            to: destination.clone(),
                        });
                    }
                },
            };

        self.base.insert_element(model, source, false);
        self.base.insert_element(model, destination, false);
        Ok(self.push_step(relationship, description, response))
    }

    fn push_step(&mut self, id: RelationshipId, description: Option<&str>, response: bool) -> String {
        let order = self.sequence.increment();
        debug!(view = self.base.key(), relationship:% = id, order = order.as_str(), response; "Added interaction");
        let mut view = RelationshipView::new(id);
        view.description = description.map(str::to_owned);
        view.order = Some(order.clone());
        view.response = response;
        self.base.push_relationship_view(view);
        order
    }

    pub fn start_child_sequence(&mut self) {
        self.sequence.start_child_sequence();
    }

    pub fn end_child_sequence(&mut self) -> Result<(), ViewError> {
        self.sequence.end_child_sequence()
    }

    pub fn start_parallel_sequence(&mut self) {
        self.sequence.start_parallel_sequence();
    }

    /// See [`SequenceNumber::end_parallel_sequence`].
    pub fn end_parallel_sequence(&mut self, continue_numbering: bool) -> Result<(), ViewError> {
        self.sequence.end_parallel_sequence(continue_numbering)
    }

    /// Checks `element` against the scoping rules of this view.
    fn scope_rule(&self, model: &Model, element: &Element) -> Option<ScopeRule> {
        let kind = element.kind();
        if kind.is_deployment() {
            return Some(ScopeRule::UnsupportedElementKind);
        }
        let Some(scope) = self.scope.as_ref().and_then(|scope| model.element(scope)) else {
            return match kind {
                ElementKind::Person | ElementKind::SoftwareSystem => None,
                _ => Some(ScopeRule::LandscapeElementsOnly),
            };
        };
        if element.id() == scope.id() {
            return Some(ScopeRule::ScopeItself);
        }

        match (scope.kind(), kind) {
            (ElementKind::SoftwareSystem, ElementKind::Container)
                if element.parent() != Some(scope.id()) =>
            {
                Some(ScopeRule::ContainerOutsideScope)
            }
            (ElementKind::SoftwareSystem, ElementKind::Component) => {
                Some(ScopeRule::ComponentsNotAllowed)
            }
            (ElementKind::Container, _) if scope.parent() == Some(element.id()) => {
                Some(ScopeRule::ParentOfScope)
            }
            (ElementKind::Container, ElementKind::Component)
                if element.parent() != Some(scope.id()) =>
            {
                Some(ScopeRule::ComponentOutsideScope)
            }
            _ => None,
        }
    }
}

/// Finds the relationship from `source` to `destination` that best matches
/// the requested description and technology.
fn find_relationship<'a>(
    model: &'a Model,
    source: &ElementId,
    destination: &ElementId,
    description: Option<&str>,
    technology: Option<&str>,
) -> Option<&'a Relationship> {
    let candidates: Vec<&Relationship> = model
        .efferent_relationships(source)
        .filter(|relationship| relationship.destination() == destination)
        .collect();
    let score = |relationship: &Relationship| {
        let description_matches = description == Some(relationship.description());
        let technology_matches = technology.is_some() && technology == relationship.technology();
        u8::from(description_matches) * 2 + u8::from(technology_matches)
    };

    let mut best: Option<&Relationship> = None;
    for candidate in candidates {
        if best.is_none_or(|best| score(candidate) > score(best)) {
            best = Some(candidate);
        }
    }
    best
}

impl View for DynamicView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewBase {
        &mut self.base
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Dynamic
    }

    fn check_element(&self, model: &Model, element: &Element) -> Result<(), ViewError> {
        match self.scope_rule(model, element) {
            Some(rule) => Err(ViewError::ScopeViolation {
                element: element.id().clone(),
                rule,
            }),
            None => Ok(()),
        }
    }

    /// Elements of a dynamic view never pull in relationships; they only
    /// appear through interactions.
    fn add_element(
        &mut self,
        model: &Model,
        id: &ElementId,
        _include_relationships: bool,
    ) -> Result<(), ViewError> {
        let Some(element) = model.element(id) else {
            return Ok(());
        };
        self.check_element(model, element)?;
        self.base.insert_element(model, id, false);
        Ok(())
    }

    /// Adds the relationship as the next interaction if both endpoints are
    /// present.
    fn add_relationship(&mut self, model: &Model, id: &RelationshipId) -> Result<bool, ViewError> {
        let relationship = model
            .relationship(id)
            .ok_or_else(|| ModelError::UnknownRelationship(id.clone()))?;
        if !self.base.contains_element(relationship.source())
            || !self.base.contains_element(relationship.destination())
        {
            return Ok(false);
        }
        self.push_step(id.clone(), None, false);
        Ok(true)
    }
}
