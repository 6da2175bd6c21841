//! Command-line argument definitions for the archgraph CLI.
//!
//! The [`Args`] structure is parsed from the command line using [`clap`].
//! Arguments select the workspace document to read, where to write the
//! derived document, the configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the archgraph workspace tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input workspace document (JSON)
    #[arg(help = "Path to the input workspace document")]
    pub input: String,

    /// Path to the derived workspace document
    #[arg(short, long, default_value = "workspace.out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
