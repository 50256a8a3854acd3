//! Database vendor descriptors

use std::fmt;

/// Supported database vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    MySql,
    Oracle,
    SqlServer,
}

impl Vendor {
    /// Every vendor, in registry order
    pub const ALL: [Vendor; 3] = [Vendor::MySql, Vendor::Oracle, Vendor::SqlServer];

    /// Registry key (`database.type`)
    pub fn key(self) -> &'static str {
        match self {
            Self::MySql => "MYSQL",
            Self::Oracle => "ORACLE",
            Self::SqlServer => "SQLSERVER",
        }
    }

    /// Look a vendor up by registry key, ignoring case
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|vendor| vendor.key().eq_ignore_ascii_case(key.trim()))
    }

    /// File name prefix of the driver artifact in the portal library dir
    pub fn driver_pattern(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Oracle => "ojdbc",
            Self::SqlServer => "jtds",
        }
    }

    /// Driver class written into container descriptors
    pub fn driver_class(self) -> &'static str {
        match self {
            Self::MySql => "com.mysql.jdbc.Driver",
            Self::Oracle => "oracle.jdbc.driver.OracleDriver",
            Self::SqlServer => "net.sourceforge.jtds.jdbc.Driver",
        }
    }

    /// Comment that opens the vendor's block in the persistence config
    pub fn comment_marker(self) -> &'static str {
        match self {
            Self::MySql => "<!-- MySQL",
            Self::Oracle => "<!-- Oracle",
            Self::SqlServer => "<!-- MS SQL Server",
        }
    }

    /// Name of the generated population script in the setup dir
    pub fn script_name(self) -> String {
        format!("db_{}.sql", self.key().to_lowercase())
    }

    /// Whether a trailing `;` must be removed before execution
    pub fn strips_trailing_semicolon(self) -> bool {
        matches!(self, Self::Oracle)
    }

    /// Type mapping name used by JBoss 5 datasource descriptors
    pub fn jboss5_type(self) -> &'static str {
        match self {
            Self::MySql => "mySQL",
            Self::Oracle => "Oracle9i",
            Self::SqlServer => "MS SQLSERVER2000",
        }
    }

    /// Connection validation element for JBoss 5 datasource descriptors
    pub fn jboss5_validator(self) -> &'static str {
        match self {
            Self::MySql => "<valid-connection-checker-class-name>org.jboss.resource.adapter.jdbc.vendor.MySQLValidConnectionChecker</valid-connection-checker-class-name>",
            Self::Oracle => "<valid-connection-checker-class-name>org.jboss.resource.adapter.jdbc.vendor.OracleValidConnectionChecker</valid-connection-checker-class-name>",
            Self::SqlServer => "<check-valid-connection-sql>SELECT 1 FROM sysobjects</check-valid-connection-sql>",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
