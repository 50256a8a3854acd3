//! The database role and its variants
//!
//! Each variant is a thin struct over [`DatabaseSupport`], which carries the
//! behaviour every vendor shares: the persistence config recipe and the SQL
//! executor.

use crate::driver::Driver;
use crate::executor::{ScriptReport, SqlExecutor};
use crate::persistence;
use crate::vendor::Vendor;
use anyhow::Result;
use async_trait::async_trait;
use lpi_core::config::DatabaseSettings;
use lpi_core::PatchRecipe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Query whose failure means the portal schema does not exist yet
pub const PROBE_QUERY: &str = "select count(*) as count from lum_User";

/// A database the portal can be installed against
#[async_trait]
pub trait Database: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Registry key
    fn key(&self) -> &'static str {
        self.vendor().key()
    }

    fn support(&self) -> &DatabaseSupport;

    /// Nothing to unpack for any supported vendor
    async fn extract(&self) -> Result<()> {
        Ok(())
    }

    /// Nothing to configure for any supported vendor
    async fn configure(&self) -> Result<()> {
        Ok(())
    }

    async fn install(&self) -> Result<()> {
        self.extract().await?;
        self.configure().await
    }

    /// Edits activating this vendor in the persistence config
    fn persistence_recipe(&self, lines: &[String]) -> lpi_core::Result<PatchRecipe> {
        self.support().persistence_recipe(lines)
    }

    fn executor(&self) -> &SqlExecutor {
        self.support().executor()
    }

    /// Convert and execute the script at `path`
    async fn execute_script(&self, path: &Path) -> Result<ScriptReport> {
        Ok(self.executor().execute_script_file(path).await?)
    }

    /// Number of portal users, `None` when the schema is absent
    async fn probe(&self) -> Result<Option<i64>> {
        Ok(self.executor().probe_count(PROBE_QUERY).await?)
    }
}

/// Behaviour shared by every database variant
pub struct DatabaseSupport {
    vendor: Vendor,
    settings: DatabaseSettings,
    executor: SqlExecutor,
}

impl DatabaseSupport {
    /// Support whose driver is located in `context_lib` on first use
    pub fn new(vendor: Vendor, settings: &DatabaseSettings, context_lib: impl Into<PathBuf>) -> Self {
        Self {
            vendor,
            settings: settings.clone(),
            executor: SqlExecutor::new(vendor, settings, context_lib),
        }
    }

    /// Support over an already registered driver
    pub fn with_driver(vendor: Vendor, settings: &DatabaseSettings, driver: Arc<dyn Driver>) -> Self {
        Self {
            vendor,
            settings: settings.clone(),
            executor: SqlExecutor::with_driver(vendor, settings, driver),
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    pub fn executor(&self) -> &SqlExecutor {
        &self.executor
    }

    pub fn persistence_recipe(&self, lines: &[String]) -> lpi_core::Result<PatchRecipe> {
        persistence::persistence_recipe(lines, self.vendor, &self.settings)
    }
}

/// MySQL
pub struct MySql {
    support: DatabaseSupport,
}

impl MySql {
    pub fn new(settings: &DatabaseSettings, context_lib: impl Into<PathBuf>) -> Self {
        Self {
            support: DatabaseSupport::new(Vendor::MySql, settings, context_lib),
        }
    }

    pub fn with_driver(settings: &DatabaseSettings, driver: Arc<dyn Driver>) -> Self {
        Self {
            support: DatabaseSupport::with_driver(Vendor::MySql, settings, driver),
        }
    }
}

#[async_trait]
impl Database for MySql {
    fn vendor(&self) -> Vendor {
        Vendor::MySql
    }

    fn support(&self) -> &DatabaseSupport {
        &self.support
    }
}

/// Oracle; connecting needs the `oracle` feature
pub struct Oracle {
    support: DatabaseSupport,
}

impl Oracle {
    pub fn new(settings: &DatabaseSettings, context_lib: impl Into<PathBuf>) -> Self {
        Self {
            support: DatabaseSupport::new(Vendor::Oracle, settings, context_lib),
        }
    }

    pub fn with_driver(settings: &DatabaseSettings, driver: Arc<dyn Driver>) -> Self {
        Self {
            support: DatabaseSupport::with_driver(Vendor::Oracle, settings, driver),
        }
    }
}

#[async_trait]
impl Database for Oracle {
    fn vendor(&self) -> Vendor {
        Vendor::Oracle
    }

    fn support(&self) -> &DatabaseSupport {
        &self.support
    }
}

/// Microsoft SQL Server
pub struct SqlServer {
    support: DatabaseSupport,
}

impl SqlServer {
    pub fn new(settings: &DatabaseSettings, context_lib: impl Into<PathBuf>) -> Self {
        Self {
            support: DatabaseSupport::new(Vendor::SqlServer, settings, context_lib),
        }
    }

    pub fn with_driver(settings: &DatabaseSettings, driver: Arc<dyn Driver>) -> Self {
        Self {
            support: DatabaseSupport::with_driver(Vendor::SqlServer, settings, driver),
        }
    }
}

#[async_trait]
impl Database for SqlServer {
    fn vendor(&self) -> Vendor {
        Vendor::SqlServer
    }

    fn support(&self) -> &DatabaseSupport {
        &self.support
    }
}

/// Create the database variant for `vendor`
pub fn create_database(
    vendor: Vendor,
    settings: &DatabaseSettings,
    context_lib: impl Into<PathBuf>,
) -> Box<dyn Database> {
    match vendor {
        Vendor::MySql => Box::new(MySql::new(settings, context_lib)),
        Vendor::Oracle => Box::new(Oracle::new(settings, context_lib)),
        Vendor::SqlServer => Box::new(SqlServer::new(settings, context_lib)),
    }
}
