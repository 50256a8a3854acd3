//! Sequential execution of SQL statements
//!
//! The vendor driver is registered lazily, once per executor: the first
//! connection locates the driver artifact in the portal library directory and
//! later connections reuse it without looking again.

use crate::convert;
use crate::driver::{Connection, Credentials, Driver, NativeDriver};
use crate::error::{Error, Result};
use crate::vendor::Vendor;
use lpi_core::config::DatabaseSettings;
use lpi_core::ProgressMeter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Outcome of one script execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Statements in the script
    pub total: usize,
    /// Statements that completed
    pub executed: usize,
    /// The statement that stopped the script
    pub failure: Option<StatementFailure>,
}

/// A failed statement and its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub index: usize,
    pub message: String,
}

impl ScriptReport {
    /// Statements sent to the database, including a failed one
    pub fn attempted(&self) -> usize {
        self.executed + usize::from(self.failure.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.executed == self.total
    }
}

/// Runs statements against the configured database
pub struct SqlExecutor {
    vendor: Vendor,
    credentials: Credentials,
    context_lib: PathBuf,
    driver: OnceCell<Arc<dyn Driver>>,
}

impl SqlExecutor {
    /// Executor that registers the native driver on first use
    pub fn new(vendor: Vendor, settings: &DatabaseSettings, context_lib: impl Into<PathBuf>) -> Self {
        Self {
            vendor,
            credentials: credentials(settings),
            context_lib: context_lib.into(),
            driver: OnceCell::new(),
        }
    }

    /// Executor with an already registered driver
    pub fn with_driver(vendor: Vendor, settings: &DatabaseSettings, driver: Arc<dyn Driver>) -> Self {
        Self {
            vendor,
            credentials: credentials(settings),
            context_lib: PathBuf::new(),
            driver: OnceCell::new_with(Some(driver)),
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Whether a driver has been registered
    pub fn is_registered(&self) -> bool {
        self.driver.initialized()
    }

    async fn driver(&self) -> Result<&Arc<dyn Driver>> {
        self.driver
            .get_or_try_init(|| async {
                let artifact = locate_driver(self.vendor, &self.context_lib)?;
                info!(
                    "- Registering driver {} from {}",
                    self.vendor.driver_class(),
                    artifact.display()
                );
                Ok::<Arc<dyn Driver>, Error>(Arc::new(NativeDriver::new(self.vendor, artifact)))
            })
            .await
    }

    /// Open a connection with the configured credentials
    pub async fn create_connection(&self) -> Result<Box<dyn Connection>> {
        let driver = self.driver().await?;
        debug!("Connecting to {} with {}", self.credentials.url, driver.name());
        driver.connect(&self.credentials).await
    }

    /// Execute one statement on `conn`, applying vendor quirks
    pub async fn execute_statement(&self, sql: &str, conn: &mut dyn Connection) -> Result<()> {
        let sql = if self.vendor.strips_trailing_semicolon() {
            sql.strip_suffix(';').unwrap_or(sql)
        } else {
            sql
        };
        debug!("  |- {}", sql);
        conn.execute(sql).await
    }

    /// Close `conn`, logging rather than raising a failure
    pub async fn close_connection(&self, conn: Box<dyn Connection>) {
        if let Err(e) = conn.close().await {
            error!("{}", e);
        }
    }

    /// Execute `statements` in order, stopping at the first failure
    ///
    /// A failure is logged with its 1-based position and recorded in the
    /// report; only a failure to connect is returned as an error. The
    /// connection is closed on every path.
    pub async fn execute_script(&self, statements: &[String]) -> Result<ScriptReport> {
        let mut conn = self.create_connection().await?;
        let total = statements.len();
        let mut report = ScriptReport {
            total,
            ..Default::default()
        };
        let mut progress = ProgressMeter::new();

        for (i, sql) in statements.iter().enumerate() {
            if let Err(e) = self.execute_statement(sql, conn.as_mut()).await {
                error!("(Line {}) {}", i + 1, e);
                report.failure = Some(StatementFailure {
                    index: i + 1,
                    message: e.to_string(),
                });
                break;
            }
            report.executed += 1;
            progress.tick_with(|| format!("  |- {} of {} statements executed", i + 1, total));
        }

        self.close_connection(conn).await;
        info!("  +- Finished execution of {} statements", report.attempted());
        Ok(report)
    }

    /// Convert the script at `path` and execute it
    pub async fn execute_script_file(&self, path: &Path) -> Result<ScriptReport> {
        info!("- Executing script {}", path.display());
        let statements = convert::convert_file(path)?;
        self.execute_script(&statements).await
    }

    /// Run a count query on a fresh connection
    ///
    /// Failing to connect is an error. A query the database rejects, as on a
    /// missing table, gives `None`.
    pub async fn probe_count(&self, sql: &str) -> Result<Option<i64>> {
        let mut conn = self.create_connection().await?;
        let count = conn.query_count(sql).await;
        self.close_connection(conn).await;
        match count {
            Ok(count) => Ok(Some(count)),
            Err(e) => {
                debug!("Count query failed: {}", e);
                Ok(None)
            }
        }
    }
}

fn credentials(settings: &DatabaseSettings) -> Credentials {
    Credentials {
        url: settings.url.clone(),
        user: settings.user.clone(),
        password: settings.password.clone(),
    }
}

/// Driver artifact for `vendor` in `dir`: the last file, by name, that
/// starts with the vendor's driver pattern
pub fn locate_driver(vendor: Vendor, dir: &Path) -> Result<PathBuf> {
    let pattern = vendor.driver_pattern();
    let entries = std::fs::read_dir(dir).map_err(|e| lpi_core::Error::io(dir, e))?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(pattern))
        })
        .collect();
    matches.sort();

    matches
        .pop()
        .ok_or_else(|| Error::driver_not_found(vendor.key(), pattern, dir))
}
