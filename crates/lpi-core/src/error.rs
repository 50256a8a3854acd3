//! Error types for lpi-core

use std::path::Path;
use thiserror::Error;

/// Result type alias using lpi-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the installer
#[derive(Error, Debug)]
pub enum Error {
    /// IO error bound to the file it happened on
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// A property holds a value that cannot be interpreted
    #[error("Invalid value for {key}: {value}")]
    InvalidProperty { key: String, value: String },

    /// A remove-until-match edit ran off the end of the line list
    #[error("Marker {marker:?} not found at or after line {start}")]
    MarkerNotFound { start: usize, marker: String },

    /// A patch edit addressed a line outside the loaded file
    #[error("Patch index {index} out of range for {len} lines")]
    IndexOutOfRange { index: usize, len: usize },

    /// Embedded template resource missing
    #[error("Template resource not found: {name}")]
    ResourceNotFound { name: String },

    /// Embedded template resource is not text
    #[error("Template resource is not valid UTF-8: {name}")]
    ResourceEncoding { name: String },

    /// A shell command could not be started
    #[error("Failed to run command `{command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error for the given path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid property error
    pub fn invalid_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a marker not found error
    pub fn marker_not_found(start: usize, marker: impl Into<String>) -> Self {
        Self::MarkerNotFound {
            start,
            marker: marker.into(),
        }
    }

    /// Create a resource not found error
    pub fn resource_not_found(name: impl Into<String>) -> Self {
        Self::ResourceNotFound { name: name.into() }
    }

    /// Create a command error
    pub fn command(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Command {
            command: command.into(),
            source,
        }
    }
}
