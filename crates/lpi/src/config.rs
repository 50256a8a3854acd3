//! Configuration file lookup

use anyhow::{bail, Context, Result};
use lpi_core::config::CONFIG_FILE_NAME;
use lpi_core::PropertyMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locate the configuration file
///
/// An explicit path must exist. Otherwise `./lpi.yaml` is tried, then
/// `lpi/lpi.yaml` under the user configuration directory.
pub fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Configuration file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("lpi").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file()))
}

/// Load the property map, empty when no configuration file is found
pub fn load_properties(explicit: Option<&Path>) -> Result<PropertyMap> {
    match find_config(explicit)? {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            PropertyMap::load(&path)
                .with_context(|| format!("Failed to load {}", path.display()))
        }
        None => {
            debug!("No configuration file found, using defaults");
            Ok(PropertyMap::new())
        }
    }
}
