//! # lpi-core
//!
//! Core library for the portal installer providing:
//! - The property map and the typed settings read from it
//! - The install path table rooted under the install home
//! - Flat `{{var}}` template rendering over embedded text resources
//! - The line-oriented text patch engine with backup-by-rename saves
//! - Throttled progress reporting and shell command execution

pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod patch;
pub mod paths;
pub mod progress;
pub mod templates;

pub use config::{InstallerSettings, PropertyMap};
pub use error::{Error, Result};
pub use patch::{PatchOp, PatchRecipe};
pub use paths::{InstallPath, InstallPaths};
pub use progress::ProgressMeter;
pub use templates::{Resource, TemplateScope};

/// Installer version reported in banners and the sample configuration
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
