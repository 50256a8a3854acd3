//! Installer configuration
//!
//! The property map is the single source of runtime configuration. It is
//! loaded from a YAML file whose nested mappings are flattened into dotted
//! keys (`database.url`, `server.type`, ...), then command-line overrides are
//! applied on top. Once the pipeline starts the map is only read.

mod settings;

pub use settings::{
    default_server_install_file, derive_database_type, DatabaseSettings, InstallerSettings,
    PortalSettings, ServerSettings, BASE_HTTP_PORT, KNOWN_SERVER_INSTALL_FILES,
};

use crate::error::{Error, Result};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "lpi.yaml";

/// Flat string-to-string configuration map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Create an empty property map
    pub fn new() -> Self {
        Self::default()
    }

    /// Load properties from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&content)
    }

    /// Parse properties from YAML text, flattening nested mappings
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml_ng::from_str(content)?;
        let mut map = Self::new();
        match value {
            Value::Null => {}
            Value::Mapping(_) => flatten(&mut map.entries, "", &value)?,
            _ => {
                return Err(Error::invalid_config(
                    "top level of the configuration must be a mapping",
                ))
            }
        }
        Ok(map)
    }

    /// Set a single property
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Apply `key=value` overrides, later entries winning
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<()> {
        for raw in overrides {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| Error::invalid_property(raw, "expected key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::invalid_property(raw, "empty key"));
            }
            self.set(key, value.trim());
        }
        Ok(())
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a property value or the given default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Get a boolean property; accepts `true`/`false` in any case
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::invalid_property(key, value)),
            },
        }
    }

    /// Iterate over all properties in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no properties
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(entries: &mut BTreeMap<String, String>, prefix: &str, value: &Value) -> Result<()> {
    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let key = scalar_to_string(key).ok_or_else(|| {
                    Error::invalid_config(format!("non-scalar key under '{}'", prefix))
                })?;
                let full_key = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(entries, &full_key, child)?;
            }
        }
        Value::Tagged(tagged) => flatten(entries, prefix, &tagged.value)?,
        Value::Sequence(_) => {
            return Err(Error::invalid_config(format!(
                "sequences are not supported (key '{}')",
                prefix
            )))
        }
        scalar => {
            let text = scalar_to_string(scalar).unwrap_or_default();
            entries.insert(prefix.to_string(), text);
        }
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
