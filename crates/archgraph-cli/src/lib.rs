//! CLI logic for the archgraph workspace tool.
//!
//! Reads a workspace document, applies the configured derivations and writes
//! the derived document back out.

pub mod error_adapter;

mod args;
mod config;
mod summary;

pub use args::Args;
pub use summary::Summary;

use std::fs;

use log::info;

use archgraph::{ArchgraphError, Workspace, WorkspaceBuilder};

/// Run the archgraph CLI application and report what was written.
///
/// # Errors
///
/// Returns `ArchgraphError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed workspace documents
/// - Documents referencing unknown elements or relationships
/// - Invalid views
pub fn run(args: &Args) -> Result<Summary, ArchgraphError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing workspace"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = WorkspaceBuilder::new(app_config);
    let mut workspace = Workspace::from_json(&source)?;
    let derivation = builder.derive(&mut workspace)?;
    let json = builder.render_json(&workspace)?;

    fs::write(&args.output, json)?;

    info!(
        workspace = workspace.name(),
        views = workspace.views().len(),
        output_file = args.output;
        "Workspace written"
    );

    Ok(Summary::new(&workspace, derivation, &args.output))
}
