//! Connection seam between the executor and the vendor drivers

mod mysql;
mod oracle;
mod sqlserver;

use crate::error::Result;
use crate::vendor::Vendor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Login for one connection
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub user: String,
    pub password: String,
}

/// An open database session
#[async_trait]
pub trait Connection: Send {
    /// Execute one statement, discarding any result
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Run a query whose first column of the first row is a count
    async fn query_count(&mut self, sql: &str) -> Result<i64>;

    /// Close the session
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens connections for one vendor
#[async_trait]
pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>>;
}

/// Native driver selected by vendor
///
/// The artifact is the driver jar found in the portal library directory.
/// It is not loaded; its presence is what registration checks for.
#[derive(Debug, Clone)]
pub struct NativeDriver {
    vendor: Vendor,
    artifact: PathBuf,
}

impl NativeDriver {
    pub fn new(vendor: Vendor, artifact: impl Into<PathBuf>) -> Self {
        Self {
            vendor,
            artifact: artifact.into(),
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }
}

#[async_trait]
impl Driver for NativeDriver {
    fn name(&self) -> &str {
        self.vendor.driver_class()
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>> {
        match self.vendor {
            Vendor::MySql => mysql::connect(credentials).await,
            Vendor::Oracle => oracle::connect(credentials).await,
            Vendor::SqlServer => sqlserver::connect(credentials).await,
        }
    }
}
