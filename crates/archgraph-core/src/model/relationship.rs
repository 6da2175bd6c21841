//! Directed, described edges between elements.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    identifier::{ElementId, RelationshipId},
    model::tags::{self, Tags},
};

/// Whether the source waits for the destination.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionStyle {
    #[default]
    Synchronous,
    Asynchronous,
}

impl InteractionStyle {
    /// Returns the tag carried by relationships of this style.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Synchronous => tags::SYNCHRONOUS,
            Self::Asynchronous => tags::ASYNCHRONOUS,
        }
    }
}

/// A directed edge from a source element to a destination element.
///
/// Equality uses (source, destination, description) only.
#[derive(Debug, Clone)]
pub struct Relationship {
    id: RelationshipId,
    source: ElementId,
    destination: ElementId,
    description: String,
    technology: Option<String>,
    interaction_style: InteractionStyle,
    tags: Tags,
    url: Option<String>,
    properties: IndexMap<String, String>,
    linked_relationship: Option<RelationshipId>,
}

impl Relationship {
    pub(crate) fn new(
        id: RelationshipId,
        source: ElementId,
        destination: ElementId,
        description: String,
        technology: Option<String>,
        interaction_style: InteractionStyle,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            description,
            technology,
            interaction_style,
            tags: Tags::with_required(&[tags::RELATIONSHIP, interaction_style.tag()]),
            url: None,
            properties: IndexMap::new(),
            linked_relationship: None,
        }
    }

    pub fn id(&self) -> &RelationshipId {
        &self.id
    }

    pub fn source(&self) -> &ElementId {
        &self.source
    }

    pub fn destination(&self) -> &ElementId {
        &self.destination
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn interaction_style(&self) -> InteractionStyle {
        self.interaction_style
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// For a relationship between container instances, the container
    /// relationship it was replicated from.
    pub fn linked_relationship(&self) -> Option<&RelationshipId> {
        self.linked_relationship.as_ref()
    }

    pub(crate) fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    pub(crate) fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    pub(crate) fn properties_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.properties
    }

    pub(crate) fn set_linked_relationship(&mut self, linked: Option<RelationshipId>) {
        self.linked_relationship = linked;
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.description == other.description
    }
}

impl Eq for Relationship {}

impl Hash for Relationship {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.destination.hash(state);
        self.description.hash(state);
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} `{}`",
            self.source, self.destination, self.description
        )
    }
}
