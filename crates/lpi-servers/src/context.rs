//! State shared by the portal and server install steps

use lpi_core::paths::to_slash;
use lpi_core::{InstallPath, InstallPaths, InstallerSettings};
use lpi_database::Vendor;
use lpi_fetch::Fetcher;
use std::path::PathBuf;
use tracing::warn;

/// Name used when the local host name cannot be read
const FALLBACK_HOSTNAME: &str = "localhost";

/// Settings, paths and collaborators for one install run
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub settings: InstallerSettings,
    pub paths: InstallPaths,
    pub vendor: Vendor,
    pub fetcher: Fetcher,
    hostname: String,
}

impl InstallContext {
    pub fn new(settings: InstallerSettings, vendor: Vendor, fetcher: Fetcher) -> Self {
        let paths = InstallPaths::new(&settings.home, &settings.server.kind);
        Self {
            settings,
            paths,
            vendor,
            fetcher,
            hostname: local_hostname(),
        }
    }

    /// Override the host name used for server ids and routes
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port_offset(&self) -> i32 {
        self.settings.portal.port_offset()
    }

    /// Port of the framework URL
    pub fn http_port(&self) -> i32 {
        self.settings
            .portal
            .framework_url
            .port_or_known_default()
            .map(i32::from)
            .unwrap_or(lpi_core::config::BASE_HTTP_PORT)
    }

    /// `{host}-{offset}`, the portal server id and the container route
    pub fn node_id(&self) -> String {
        format!("{}-{}", self.hostname, self.port_offset())
    }

    pub fn context_name(&self) -> String {
        self.settings.portal.context_name()
    }

    pub fn context_path(&self) -> String {
        self.settings.portal.context_path()
    }

    pub fn deploy_as_war(&self) -> bool {
        self.settings.server.deploy_as_war
    }

    pub fn windows(&self) -> bool {
        self.settings.windows
    }

    pub fn path(&self, key: InstallPath) -> PathBuf {
        self.paths.path(key)
    }

    pub fn path_with(&self, key: InstallPath, args: &[&str]) -> PathBuf {
        self.paths.path_with(key, args)
    }

    /// File or directory under the server directory
    pub fn server_file(&self, relative: &str) -> PathBuf {
        self.path(InstallPath::ServerDir).join(relative)
    }

    /// Portal data directory as written into config files
    pub fn data_path(&self) -> String {
        self.paths.display(InstallPath::PortalData)
    }

    /// What the server deploys: the web archive or the web root
    pub fn context_root(&self) -> PathBuf {
        if self.deploy_as_war() {
            self.path(InstallPath::WebArchive)
        } else {
            self.path(InstallPath::PortalWww)
        }
    }

    pub fn java_home(&self) -> String {
        to_slash(std::path::Path::new(&self.settings.server.java_home))
    }
}

fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("Cannot read host name, using {}: {}", FALLBACK_HOSTNAME, e);
            FALLBACK_HOSTNAME.to_string()
        }
    }
}
