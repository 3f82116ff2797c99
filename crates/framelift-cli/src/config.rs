//! Mapping-configuration loading for the CLI
//!
//! This module handles finding and loading the TOML mapping configuration
//! from various locations (explicit path, local directory, system
//! directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use thiserror::Error;

use framelift::{FrameliftError, mapping::MappingSet};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for FrameliftError {
    fn from(err: ConfigError) -> Self {
        FrameliftError::Config(err.to_string())
    }
}

/// Find and load the mapping configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (framelift/mappings.toml)
/// 3. Platform-specific config directory
/// 4. Empty mapping set if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Configuration file exists but cannot be parsed
pub fn load_mappings(explicit_path: Option<impl AsRef<Path>>) -> Result<MappingSet, FrameliftError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading mappings from explicit path");
        return load_mappings_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("framelift/mappings.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading mappings from local path");
        return load_mappings_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "framelift", "framelift") {
        let config_dir = proj_dirs.config_dir();
        let system_config = config_dir.join("mappings.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading mappings from system path");
            return load_mappings_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System mapping file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no configuration is found, run with no mappings
    warn!("No mapping configuration found; every frame will be left alone");
    Ok(MappingSet::default())
}

/// Load the mapping configuration from a TOML file
fn load_mappings_file(path: impl AsRef<Path>) -> Result<MappingSet, FrameliftError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let mappings: MappingSet =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(mappings)
}
