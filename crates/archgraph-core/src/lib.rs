//! Archgraph Core Types
//!
//! This crate provides the architecture model that the rest of archgraph
//! builds on. It includes:
//!
//! - **Identifiers**: model-scoped element and relationship ids and their
//!   generator ([`identifier`] module)
//! - **Model**: the element graph with scoped name uniqueness, container
//!   instance replication and implicit relationship propagation ([`model`]
//!   module)
//! - **Records**: the persisted record tree a model hydrates from and writes
//!   back to ([`record`] module)

pub mod error;
pub mod identifier;
pub mod model;
pub mod record;

pub use error::ModelError;
