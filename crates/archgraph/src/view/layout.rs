//! Layout metadata carried by views.
//!
//! Archgraph does not lay diagrams out itself. Views only record positions a
//! renderer or editor produced, or the parameters a renderer should use for
//! its own automatic layout.

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// Direction in which ranks of an automatic layout are placed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

/// Parameters for a renderer's automatic layout of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticLayout {
    rank_direction: RankDirection,
    rank_separation: u32,
    node_separation: u32,
    edge_separation: u32,
    vertices: bool,
}

impl AutomaticLayout {
    /// Creates automatic layout parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidArgument`] if any separation is negative.
    pub fn new(
        rank_direction: RankDirection,
        rank_separation: i32,
        node_separation: i32,
        edge_separation: i32,
        vertices: bool,
    ) -> Result<Self, ViewError> {
        Ok(Self {
            rank_direction,
            rank_separation: separation("rank", rank_separation)?,
            node_separation: separation("node", node_separation)?,
            edge_separation: separation("edge", edge_separation)?,
            vertices,
        })
    }

    pub fn rank_direction(&self) -> RankDirection {
        self.rank_direction
    }

    pub fn rank_separation(&self) -> u32 {
        self.rank_separation
    }

    pub fn node_separation(&self) -> u32 {
        self.node_separation
    }

    pub fn edge_separation(&self) -> u32 {
        self.edge_separation
    }

    /// Whether the renderer should create vertices for edges.
    pub fn vertices(&self) -> bool {
        self.vertices
    }
}

impl Default for AutomaticLayout {
    fn default() -> Self {
        Self {
            rank_direction: RankDirection::TopBottom,
            rank_separation: 300,
            node_separation: 300,
            edge_separation: 0,
            vertices: false,
        }
    }
}

fn separation(name: &str, value: i32) -> Result<u32, ViewError> {
    u32::try_from(value).map_err(|_| {
        ViewError::InvalidArgument(format!(
            "the {name} separation must be a non-negative number, got {value}"
        ))
    })
}

/// A bend point of a relationship line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}
