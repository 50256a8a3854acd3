//! Variant lookup for the database and application server roles

use lpi_core::InstallerSettings;
use lpi_database::Vendor;
use lpi_servers::{create_server, ApplicationServer, SERVER_KEYS};
use std::fmt;
use thiserror::Error;

/// A pluggable role of the install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    JavaServer,
    Database,
}

impl Role {
    /// Registry keys accepted for this role
    pub fn keys(self) -> Vec<&'static str> {
        match self {
            Self::JavaServer => SERVER_KEYS.to_vec(),
            Self::Database => Vendor::ALL.iter().map(|vendor| vendor.key()).collect(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JavaServer => write!(f, "javaserver"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// A key with no registered variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub role: Role,
    pub key: String,
}

impl Unresolved {
    /// Report lines: the offending key followed by every valid key
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} is not an valid {} type of:", self.key, self.role)];
        lines.extend(self.role.keys().iter().map(|key| format!(" - {}", key)));
        lines.push(String::new());
        lines
    }
}

/// One or both configured variant keys are unknown
#[derive(Debug, Error)]
#[error("invalid variant selection: {}", describe(.unresolved))]
pub struct ResolutionError {
    pub unresolved: Vec<Unresolved>,
}

impl ResolutionError {
    /// Process exit status for an invalid selection
    pub const EXIT_CODE: i32 = 2;
}

fn describe(unresolved: &[Unresolved]) -> String {
    unresolved
        .iter()
        .map(|u| format!("{} type {}", u.role, u.key))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The variants selected for one run
pub struct Variants {
    pub vendor: Vendor,
    pub server: Box<dyn ApplicationServer>,
}

impl fmt::Debug for Variants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variants")
            .field("vendor", &self.vendor)
            .field("server", &self.server.key())
            .finish()
    }
}

/// Keyed lookup of database and server variants
pub struct StrategyRegistry;

impl StrategyRegistry {
    /// Resolve both roles, reporting every unknown key at once
    pub fn resolve(settings: &InstallerSettings) -> Result<Variants, ResolutionError> {
        let server = create_server(&settings.server.kind);
        let vendor = Vendor::from_key(&settings.database.kind);

        match (server, vendor) {
            (Some(server), Some(vendor)) => Ok(Variants { vendor, server }),
            (server, vendor) => {
                let mut unresolved = Vec::new();
                if server.is_none() {
                    unresolved.push(Unresolved {
                        role: Role::JavaServer,
                        key: settings.server.kind.clone(),
                    });
                }
                if vendor.is_none() {
                    unresolved.push(Unresolved {
                        role: Role::Database,
                        key: settings.database.kind.clone(),
                    });
                }
                Err(ResolutionError { unresolved })
            }
        }
    }
}
