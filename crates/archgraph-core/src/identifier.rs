//! Model-scoped identifiers and the sequential identifier generator.
//!
//! Every element and relationship in a [`Model`](crate::model::Model) carries a
//! string identifier that is unique within that model. Fresh identifiers are
//! produced by an [`IdGenerator`] owned by the model; identifiers loaded from a
//! persisted document are registered with [`IdGenerator::found`] so that later
//! generated identifiers never collide with them.
//!
//! # Examples
//!
//! ```
//! use archgraph_core::identifier::IdGenerator;
//!
//! let mut generator = IdGenerator::new();
//! assert_eq!(generator.generate_id(), "1");
//! assert_eq!(generator.generate_id(), "2");
//!
//! // An id seen in a persisted document moves the sequence forward.
//! generator.found("41");
//! assert_eq!(generator.generate_id(), "42");
//! ```

use std::{borrow::Borrow, collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

/// Identifier of an element within a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

/// Identifier of a relationship within a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Creates an identifier from its string form.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the string form of this identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(ElementId);
string_id!(RelationshipId);

/// Generates sequential integer identifiers for one model.
///
/// Elements and relationships share a single namespace, so an identifier is
/// never reused across the two.
///
/// # Thread Safety
///
/// The generator is plain mutable state owned by its model. Callers sharing a
/// model across threads must serialize access to the whole model.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
    used: HashSet<String>,
}

impl IdGenerator {
    /// Creates a generator whose first identifier is `"1"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused identifier and registers it as used.
    pub fn generate_id(&mut self) -> String {
        loop {
            self.last += 1;
            let id = self.last.to_string();
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Registers an identifier assigned outside this generator.
    ///
    /// Numeric identifiers advance the sequence so that the next generated
    /// identifier is `max(registered) + 1`. Non-numeric identifiers are only
    /// recorded as used.
    ///
    /// Returns `false` if the identifier was already registered.
    pub fn found(&mut self, id: &str) -> bool {
        if let Ok(value) = id.parse::<u64>() {
            self.last = self.last.max(value);
        }
        self.used.insert(id.to_owned())
    }

    /// Returns `true` if the identifier has been generated or found.
    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_generate_sequential() {
        let mut generator = IdGenerator::new();

        let ids: Vec<String> = (0..5).map(|_| generator.generate_id()).collect();

        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_found_advances_sequence() {
        let mut generator = IdGenerator::new();
        generator.generate_id();

        assert!(generator.found("5"));
        assert_eq!(generator.generate_id(), "6");
    }

    #[test]
    fn test_found_lower_id_keeps_sequence() {
        let mut generator = IdGenerator::new();
        generator.found("10");
        generator.found("3");

        assert_eq!(generator.generate_id(), "11");
    }

    #[test]
    fn test_found_non_numeric() {
        let mut generator = IdGenerator::new();

        assert!(generator.found("customer"));
        assert!(!generator.found("customer"));
        assert!(generator.is_used("customer"));
        assert_eq!(generator.generate_id(), "1");
    }

    #[test]
    fn test_found_reports_duplicates() {
        let mut generator = IdGenerator::new();
        let id = generator.generate_id();

        assert!(!generator.found(&id));
    }

    #[test]
    fn test_id_comparisons() {
        let id = ElementId::new("7");

        assert!(id == "7");
        assert_eq!(id.as_str(), "7");
        assert_eq!(format!("{id}"), "7");
        assert_eq!(RelationshipId::from("3"), RelationshipId::new(String::from("3")));
    }

    proptest! {
        #[test]
        fn generated_ids_never_collide_with_found(found in proptest::collection::vec(0u64..500, 0..20), count in 1usize..50) {
            let mut generator = IdGenerator::new();
            for id in &found {
                generator.found(&id.to_string());
            }
            let max_found = found.iter().copied().max().unwrap_or(0);

            let mut generated = HashSet::new();
            for _ in 0..count {
                let id = generator.generate_id();
                let value: u64 = id.parse().unwrap();
                prop_assert!(value > max_found);
                prop_assert!(generated.insert(id));
            }
        }
    }
}
