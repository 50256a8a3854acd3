//! # lpi-database
//!
//! Database side of the portal installer:
//! - Reconstruction of statements from raw SQL scripts
//! - Sequential script execution over native drivers, registered once
//! - The `Database` role with its MySQL, Oracle and SQL Server variants
//! - The persistence config recipe that injects connection settings

pub mod convert;
pub mod database;
pub mod driver;
pub mod error;
pub mod executor;
pub mod jdbc;
pub mod persistence;
pub mod vendor;

pub use convert::convert;
pub use database::{create_database, Database, DatabaseSupport, MySql, Oracle, SqlServer, PROBE_QUERY};
pub use driver::{Connection, Credentials, Driver};
pub use error::{Error, Result};
pub use executor::{ScriptReport, SqlExecutor, StatementFailure};
pub use vendor::Vendor;
