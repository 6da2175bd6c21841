//! Implicit relationship propagation.
//!
//! A relationship between two deeply nested elements implies relationships
//! between their enclosing elements: if a container of one system uses a
//! container of another, then the first system uses the second. This pass
//! derives those relationships in one batch.

use std::iter;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::{
    error::ModelError,
    identifier::{ElementId, RelationshipId},
    model::Model,
};

/// How many containment levels above each endpoint are considered.
const LINEAGE_DEPTH: usize = 2;

/// Descriptions and technologies contributed to one candidate pair.
#[derive(Debug, Default)]
struct Candidate {
    descriptions: IndexSet<String>,
    technologies: IndexSet<Option<String>>,
}

impl Candidate {
    /// The shared description, or empty when contributors disagree.
    fn description(&self) -> &str {
        match self.descriptions.len() {
            1 => self.descriptions[0].as_str(),
            _ => "",
        }
    }

    /// The shared technology, or none when contributors disagree.
    fn technology(&self) -> Option<&str> {
        match self.technologies.len() {
            1 => self.technologies[0].as_deref(),
            _ => None,
        }
    }
}

impl Model {
    /// Creates the relationships implied by every existing relationship.
    ///
    /// For a relationship `S -> D`, every pair drawn from `S` and its parent
    /// and grandparent on one side and `D` and its parent and grandparent on
    /// the other is a candidate, unless the two are the same element, one
    /// directly contains the other (parent or grandparent), or the source
    /// already has a relationship to the destination. Each distinct candidate
    /// pair yields one relationship whose description and technology are kept
    /// only when all contributing relationships agree on them.
    ///
    /// Returns the created relationships in creation order. Running the pass
    /// again without structural changes creates nothing.
    pub fn add_implicit_relationships(&mut self) -> Result<Vec<RelationshipId>, ModelError> {
        let mut candidates: IndexMap<(ElementId, ElementId), Candidate> = IndexMap::new();

        for relationship in self.relationships.values() {
            let sources = self.lineage(relationship.source());
            let destinations = self.lineage(relationship.destination());

            for source in &sources {
                for destination in &destinations {
                    if source == destination
                        || self.is_parent_or_grandparent(source, destination)
                        || self.is_parent_or_grandparent(destination, source)
                        || self.has_efferent_relationship_with(source, destination)
                    {
                        continue;
                    }

                    trace!(source:% = source, destination:% = destination; "Implied relationship candidate");
                    let candidate = candidates
                        .entry((source.clone(), destination.clone()))
                        .or_default();
                    candidate
                        .descriptions
                        .insert(relationship.description().to_owned());
                    candidate
                        .technologies
                        .insert(relationship.technology().map(str::to_owned));
                }
            }
        }

        let mut created = Vec::new();
        for ((source, destination), candidate) in &candidates {
            let id = self.add_relationship(
                source,
                destination,
                candidate.description(),
                candidate.technology(),
                None,
            )?;
            created.extend(id);
        }

        debug!(candidates = candidates.len(), created = created.len(); "Implicit relationships added");
        Ok(created)
    }

    /// Returns the element followed by its parent and grandparent.
    fn lineage(&self, id: &ElementId) -> Vec<ElementId> {
        iter::once(id.clone())
            .chain(
                self.ancestors(id)
                    .take(LINEAGE_DEPTH)
                    .map(|element| element.id().clone()),
            )
            .collect()
    }

    fn is_parent_or_grandparent(&self, ancestor: &ElementId, descendant: &ElementId) -> bool {
        self.ancestors(descendant)
            .take(LINEAGE_DEPTH)
            .any(|element| element.id() == ancestor)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Fixture {
        model: Model,
        a: ElementId,
        a_b1: ElementId,
        b: ElementId,
        b_c1: ElementId,
    }

    fn two_systems() -> Fixture {
        let mut model = Model::new();
        let a = model.add_software_system("A", "").unwrap();
        let a_b1 = model.add_container(&a, "B1", "", None).unwrap();
        let b = model.add_software_system("B", "").unwrap();
        let b_c1 = model.add_container(&b, "C1", "", None).unwrap();
        Fixture {
            model,
            a,
            a_b1,
            b,
            b_c1,
        }
    }

    fn pairs(model: &Model, ids: &[RelationshipId]) -> HashSet<(ElementId, ElementId)> {
        ids.iter()
            .map(|id| {
                let relationship = model.relationship(id).unwrap();
                (
                    relationship.source().clone(),
                    relationship.destination().clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_propagates_to_ancestors() {
        let Fixture {
            mut model,
            a,
            a_b1,
            b,
            b_c1,
        } = two_systems();
        model.uses(&a_b1, &b_c1, "Sends orders", Some("HTTPS")).unwrap();

        let created = model.add_implicit_relationships().unwrap();

        let expected: HashSet<(ElementId, ElementId)> = [
            (a.clone(), b_c1.clone()),
            (a_b1.clone(), b.clone()),
            (a.clone(), b.clone()),
        ]
        .into_iter()
        .collect();
        assert_eq!(pairs(&model, &created), expected);

        let a_to_b = model
            .efferent_relationships(&a)
            .find(|r| r.destination() == &b)
            .unwrap();
        assert_eq!(a_to_b.description(), "Sends orders");
        assert_eq!(a_to_b.technology(), Some("HTTPS"));
    }

    #[test]
    fn test_differing_descriptions_merge_to_empty() {
        let Fixture {
            mut model,
            a,
            a_b1,
            b,
            b_c1,
        } = two_systems();
        let b_c2 = model.add_container(&b, "C2", "", None).unwrap();
        model.uses(&a_b1, &b_c1, "Reads", Some("SQL")).unwrap();
        model.uses(&a_b1, &b_c2, "Writes", Some("SQL")).unwrap();

        model.add_implicit_relationships().unwrap();

        let a_to_b: Vec<_> = model
            .efferent_relationships(&a)
            .filter(|r| r.destination() == &b)
            .collect();
        assert_eq!(a_to_b.len(), 1);
        assert_eq!(a_to_b[0].description(), "");
        assert_eq!(a_to_b[0].technology(), Some("SQL"));
    }

    #[test]
    fn test_no_relationships_between_ancestors_and_descendants() {
        let mut model = Model::new();
        let system = model.add_software_system("System", "").unwrap();
        let web = model.add_container(&system, "Web", "", None).unwrap();
        let api = model.add_container(&system, "Api", "", None).unwrap();
        let handler = model.add_component(&api, "Handler", "", None).unwrap();
        model.uses(&web, &handler, "Calls", None).unwrap();

        let created = model.add_implicit_relationships().unwrap();

        assert_eq!(
            pairs(&model, &created),
            [(web.clone(), api.clone())].into_iter().collect()
        );
        assert!(!model.has_efferent_relationship_with(&web, &system));
        assert!(!model.has_efferent_relationship_with(&system, &handler));
    }

    #[test]
    fn test_second_pass_creates_nothing() {
        let Fixture {
            mut model,
            a_b1,
            b_c1,
            ..
        } = two_systems();
        model.uses(&a_b1, &b_c1, "Sends orders", None).unwrap();

        assert_eq!(model.add_implicit_relationships().unwrap().len(), 3);
        assert!(model.add_implicit_relationships().unwrap().is_empty());
    }
}
