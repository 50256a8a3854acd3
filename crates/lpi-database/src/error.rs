//! Error types for lpi-database

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using lpi-database's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Database access errors
#[derive(Error, Debug)]
pub enum Error {
    /// No driver artifact for the vendor in the portal library directory
    #[error("No {vendor} driver matching '{pattern}*' found in {}", dir.display())]
    DriverNotFound {
        vendor: String,
        pattern: String,
        dir: PathBuf,
    },

    /// The JDBC URL cannot be mapped to a native connection
    #[error("Invalid JDBC URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The vendor was compiled out of this build
    #[error("{vendor} support is not available; rebuild with the `{feature}` feature")]
    Unsupported {
        vendor: String,
        feature: &'static str,
    },

    /// Error reported by the database or its driver
    #[error("{0}")]
    Sql(String),

    /// Network error while reaching the database
    #[error("Connection failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in shared installer machinery
    #[error(transparent)]
    Core(#[from] lpi_core::Error),
}

impl Error {
    pub fn driver_not_found(vendor: impl Into<String>, pattern: impl Into<String>, dir: &Path) -> Self {
        Self::DriverNotFound {
            vendor: vendor.into(),
            pattern: pattern.into(),
            dir: dir.to_path_buf(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Sql(e.to_string())
    }
}

impl From<tiberius::error::Error> for Error {
    fn from(e: tiberius::error::Error) -> Self {
        Self::Sql(e.to_string())
    }
}

#[cfg(feature = "oracle")]
impl From<oracle::Error> for Error {
    fn from(e: oracle::Error) -> Self {
        Self::Sql(e.to_string())
    }
}
