//! The report printed after a workspace has been derived and written.

use std::fmt;

use archgraph::{Derivation, Workspace};

/// Counts describing the written workspace and what derivation added to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub workspace: String,
    pub output: String,
    pub elements: usize,
    pub relationships: usize,
    pub views: usize,
    pub derivation: Derivation,
}

impl Summary {
    pub fn new(workspace: &Workspace, derivation: Derivation, output: &str) -> Self {
        Self {
            workspace: workspace.name().to_owned(),
            output: output.to_owned(),
            elements: workspace.model().elements().count(),
            relationships: workspace.model().relationships().count(),
            views: workspace.views().len(),
            derivation,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.workspace.is_empty() {
            "unnamed workspace"
        } else {
            self.workspace.as_str()
        };
        writeln!(
            f,
            "{name}: {} elements, {} relationships, {} views -> {}",
            self.elements, self.relationships, self.views, self.output
        )?;

        if self.derivation.is_empty() {
            return write!(f, "  nothing derived");
        }
        write!(
            f,
            "  implied relationships: {}",
            self.derivation.implied_relationships.len()
        )?;
        if !self.derivation.default_views.is_empty() {
            write!(f, "\n  default views:")?;
            for key in &self.derivation.default_views {
                write!(f, "\n    {key}")?;
            }
        }
        if !self.derivation.laid_out_views.is_empty() {
            write!(
                f,
                "\n  automatic layout applied to {} views",
                self.derivation.laid_out_views.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use archgraph::WorkspaceBuilder;

    use super::*;

    const SHOP: &str = r#"{
        "name": "Shop",
        "model": {
            "people": [{
                "id": "1",
                "name": "Customer",
                "relationships": [{"id": "3", "destinationId": "4"}]
            }],
            "softwareSystems": [{
                "id": "2",
                "name": "Shop",
                "containers": [{"id": "4", "name": "Web"}]
            }]
        }
    }"#;

    #[test]
    fn test_summary_lists_default_views() {
        let mut workspace = Workspace::from_json(SHOP).unwrap();
        let derivation = WorkspaceBuilder::default().derive(&mut workspace).unwrap();

        let summary = Summary::new(&workspace, derivation, "shop.json");

        assert_eq!(summary.elements, 3);
        assert_eq!(summary.relationships, 2);
        assert_eq!(
            summary.to_string(),
            "Shop: 3 elements, 2 relationships, 3 views -> shop.json\n  \
             implied relationships: 1\n  \
             default views:\n    \
             SystemLandscape\n    \
             Shop-SystemContext\n    \
             Shop-Container"
        );
    }

    #[test]
    fn test_summary_without_derivation() {
        let workspace = Workspace::from_json("{}").unwrap();

        let summary = Summary::new(&workspace, Derivation::default(), "out.json");

        assert_eq!(
            summary.to_string(),
            "unnamed workspace: 0 elements, 0 relationships, 0 views -> out.json\n  nothing derived"
        );
    }
}
