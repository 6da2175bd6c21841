//! Ordered tag sets with required members.

use std::fmt;

use indexmap::IndexSet;

pub const ELEMENT: &str = "Element";
pub const PERSON: &str = "Person";
pub const SOFTWARE_SYSTEM: &str = "Software System";
pub const CONTAINER: &str = "Container";
pub const COMPONENT: &str = "Component";
pub const DEPLOYMENT_NODE: &str = "Deployment Node";
pub const INFRASTRUCTURE_NODE: &str = "Infrastructure Node";
pub const RELATIONSHIP: &str = "Relationship";
pub const SYNCHRONOUS: &str = "Synchronous";
pub const ASYNCHRONOUS: &str = "Asynchronous";

/// An insertion-ordered set of tags.
///
/// The first `required` tags are fixed by the owning entity's kind and cannot
/// be removed. Tags are persisted as a single comma-separated string.
///
/// # Examples
///
/// ```
/// use archgraph_core::model::Tags;
///
/// let mut tags = Tags::with_required(&["Element", "Person"]);
/// tags.add("Customer");
/// assert_eq!(tags.to_string(), "Element,Person,Customer");
///
/// assert!(!tags.remove("Person"));
/// assert!(tags.remove("Customer"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    tags: IndexSet<String>,
    required: usize,
}

impl Tags {
    /// Creates a tag set holding the given required tags.
    pub fn with_required(required: &[&str]) -> Self {
        let tags: IndexSet<String> = required.iter().map(|tag| (*tag).to_owned()).collect();
        let required = tags.len();
        Self { tags, required }
    }

    /// Adds a tag, trimming whitespace. Empty tags are ignored.
    ///
    /// Returns `true` if the tag was not present before.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_owned())
    }

    /// Adds every tag of a comma-separated list.
    pub fn add_all(&mut self, list: &str) {
        for tag in list.split(',') {
            self.add(tag);
        }
    }

    /// Removes a free-form tag. Required tags are never removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        match self.tags.get_index_of(tag) {
            Some(index) if index >= self.required => {
                self.tags.shift_remove(tag);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if the tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Iterates over tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, tag) in self.tags.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_all_trims_and_skips_empty() {
        let mut tags = Tags::with_required(&[ELEMENT]);
        tags.add_all(" Database , ,Legacy,Database");

        let collected: Vec<&str> = tags.iter().collect();
        assert_eq!(collected, vec!["Element", "Database", "Legacy"]);
    }

    #[test]
    fn test_required_tags_survive_removal() {
        let mut tags = Tags::with_required(&[RELATIONSHIP, SYNCHRONOUS]);

        assert!(!tags.remove(RELATIONSHIP));
        assert!(!tags.remove("missing"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_display_round_trip() {
        let mut tags = Tags::with_required(&[ELEMENT, CONTAINER]);
        tags.add("Web Browser");

        let mut parsed = Tags::with_required(&[ELEMENT, CONTAINER]);
        parsed.add_all(&tags.to_string());

        assert_eq!(parsed, tags);
    }
}
