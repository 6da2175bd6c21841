//! Configuration file loading for the CLI
//!
//! Finds and loads the TOML configuration from an explicit path, the local
//! project directory or the platform configuration directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use archgraph::{ArchgraphError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid automatic layout in {}: {message}", path.display())]
    Layout { path: PathBuf, message: String },
}

impl From<ConfigError> for ArchgraphError {
    fn from(err: ConfigError) -> Self {
        ArchgraphError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (archgraph/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if an explicit path is provided but the file doesn't
/// exist, or if a found file cannot be parsed or holds invalid settings.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ArchgraphError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("archgraph/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "archgraph", "archgraph") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ArchgraphError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(layout) = config.views().automatic_layout() {
        layout.to_layout().map_err(|e| ConfigError::Layout {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    debug!(
        implied_relationships = config.model().implied_relationships(),
        default_views = config.views().default_views(),
        automatic_layout = config.views().automatic_layout().is_some();
        "Derivations configured"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();

        assert!(matches!(err, ArchgraphError::Config(message) if message.contains("exist.toml")));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[model]\nimplied_relationships = false\n\n[views.automatic_layout]\nrank_direction = \"LeftRight\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert!(!config.model().implied_relationships());
        assert!(config.views().default_views());
        let layout = config.views().automatic_layout().unwrap().to_layout().unwrap();
        assert_eq!(layout.rank_direction(), archgraph::view::layout::RankDirection::LeftRight);
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[views.automatic_layout]\nnode_separation = -5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(
            err,
            ArchgraphError::Config(message)
                if message.starts_with("Invalid automatic layout") && message.contains("config.toml")
        ));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[views\ndefault_views = yes\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(
            err,
            ArchgraphError::Config(message)
                if message.starts_with("Failed to parse") && message.contains("broken.toml")
        ));
    }
}
