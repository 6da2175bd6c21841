//! Configuration types for deriving workspaces.
//!
//! These structures control which derivations run when a workspace is
//! loaded. All types implement [`serde::Deserialize`] for loading from
//! external sources; missing sections and fields fall back to defaults.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining model and view settings.
//! - [`ModelConfig`] - Controls derivations applied to the model.
//! - [`ViewsConfig`] - Controls default views and automatic layout.
//!
//! # Example
//!
//! ```
//! # use archgraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.model().implied_relationships());
//! assert!(config.views().automatic_layout().is_none());
//! ```

use serde::Deserialize;

use crate::{
    error::ViewError,
    view::layout::{AutomaticLayout, RankDirection},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model configuration section.
    #[serde(default)]
    model: ModelConfig,

    /// Views configuration section.
    #[serde(default)]
    views: ViewsConfig,
}

impl AppConfig {
    pub fn new(model: ModelConfig, views: ViewsConfig) -> Self {
        Self { model, views }
    }

    /// Returns the model configuration.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Returns the views configuration.
    pub fn views(&self) -> &ViewsConfig {
        &self.views
    }
}

/// Derivations applied to the model after it is loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Propagate relationships up the element hierarchy.
    implied_relationships: bool,
}

impl ModelConfig {
    pub fn new(implied_relationships: bool) -> Self {
        Self {
            implied_relationships,
        }
    }

    pub fn implied_relationships(&self) -> bool {
        self.implied_relationships
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            implied_relationships: true,
        }
    }
}

/// View derivations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Create the default views when the workspace has none.
    default_views: bool,

    /// Layout given to every view that does not have one yet.
    automatic_layout: Option<AutomaticLayoutConfig>,
}

impl ViewsConfig {
    pub fn new(default_views: bool, automatic_layout: Option<AutomaticLayoutConfig>) -> Self {
        Self {
            default_views,
            automatic_layout,
        }
    }

    pub fn default_views(&self) -> bool {
        self.default_views
    }

    pub fn automatic_layout(&self) -> Option<&AutomaticLayoutConfig> {
        self.automatic_layout.as_ref()
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            default_views: true,
            automatic_layout: None,
        }
    }
}

/// Automatic layout settings as written in a configuration file.
///
/// Separations are validated only when converted with
/// [`AutomaticLayoutConfig::to_layout`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutomaticLayoutConfig {
    rank_direction: RankDirection,
    rank_separation: i32,
    node_separation: i32,
    edge_separation: i32,
    vertices: bool,
}

impl AutomaticLayoutConfig {
    /// Converts the settings into a view layout.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidArgument`] for a negative separation.
    pub fn to_layout(&self) -> Result<AutomaticLayout, ViewError> {
        AutomaticLayout::new(
            self.rank_direction,
            self.rank_separation,
            self.node_separation,
            self.edge_separation,
            self.vertices,
        )
    }
}

impl Default for AutomaticLayoutConfig {
    fn default() -> Self {
        let layout = AutomaticLayout::default();
        Self {
            rank_direction: layout.rank_direction(),
            rank_separation: 300,
            node_separation: 300,
            edge_separation: 0,
            vertices: layout.vertices(),
        }
    }
}
