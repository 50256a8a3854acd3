//! Install path table
//!
//! Every file and directory the installer touches is named by an
//! [`InstallPath`] and resolved under the install home. Server paths carry a
//! `{server}` segment replaced by the active server type in lower case;
//! positional `{0}`/`{1}` segments are filled by the caller.

use std::path::{Path, PathBuf};

/// Logical install locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallPath {
    PortalDir,
    PortalData,
    PortalSetup,
    PortalWww,
    PortalContextLib,
    PortalEndorsedLib,
    PortalSharedLib,
    PortalStatic,
    PersistenceConfig,
    PortalConfig,
    WebArchive,
    WebDescriptor,
    ServerWebDescriptor,
    Htdocs,
    HtdocsStatic,
    ServerDir,
    ServerBin,
    /// `{0}` = context name
    TomcatContextXml,
    TomcatServerXml,
    TomcatSetenvBat,
    TomcatSetenvSh,
    JBossModules,
    /// `{0}` = database vendor in lower case
    JBossDriverModuleXml,
    /// `{0}` = context name
    JBossStandaloneWar,
    /// `{0}` = first two hex digits of the content hash, `{1}` = the rest
    JBossDomainWar,
    /// `{0}` = profile name (`standalone`, `domain`)
    JBossProfileXml,
    JBossDomainHostXml,
    /// `{0}` = profile name
    JBossProfileConf,
}

impl InstallPath {
    /// Path template relative to the install home
    pub fn template(self) -> &'static str {
        match self {
            Self::PortalDir => "/lumisportal",
            Self::PortalData => "/lumisportal/lumisdata",
            Self::PortalSetup => "/lumisportal/setup",
            Self::PortalWww => "/lumisportal/www",
            Self::PortalContextLib => "/lumisportal/www/WEB-INF/lib",
            Self::PortalEndorsedLib => "/lumisportal/lib/endorsed",
            Self::PortalSharedLib => "/lumisportal/lib/shared",
            Self::PortalStatic => "/lumisportal/www/lumis",
            Self::PersistenceConfig => "/lumisportal/lumisdata/config/lumishibernate.cfg.xml",
            Self::PortalConfig => "/lumisportal/lumisdata/config/lumisportalconfig.xml",
            Self::WebArchive => "/lumisportal/lumisportal.war",
            Self::WebDescriptor => "/lumisportal/www/WEB-INF/web.xml",
            Self::ServerWebDescriptor => "/lumisportal/www/WEB-INF/jboss-web.xml",
            Self::Htdocs => "/htdocs",
            Self::HtdocsStatic => "/htdocs/lumis",
            Self::ServerDir => "/{server}",
            Self::ServerBin => "/{server}/bin",
            Self::TomcatContextXml => "/{server}/conf/Catalina/localhost/{0}.xml",
            Self::TomcatServerXml => "/{server}/conf/server.xml",
            Self::TomcatSetenvBat => "/{server}/bin/setenv.bat",
            Self::TomcatSetenvSh => "/{server}/bin/setenv.sh",
            Self::JBossModules => "/{server}/modules",
            Self::JBossDriverModuleXml => "/{server}/modules/lumis/jdbc/driver/{0}/main/module.xml",
            Self::JBossStandaloneWar => "/{server}/standalone/deployments/{0}.war",
            Self::JBossDomainWar => "/{server}/domain/data/content/{0}/{1}/content",
            Self::JBossProfileXml => "/{server}/{0}/configuration/{0}.xml",
            Self::JBossDomainHostXml => "/{server}/domain/configuration/host.xml",
            Self::JBossProfileConf => "/{server}/bin/{0}.conf",
        }
    }
}

/// Path table bound to an install home and a server type
#[derive(Debug, Clone)]
pub struct InstallPaths {
    home: PathBuf,
    server_type: String,
}

impl InstallPaths {
    pub fn new(home: impl Into<PathBuf>, server_type: &str) -> Self {
        Self {
            home: home.into(),
            server_type: server_type.to_ascii_lowercase(),
        }
    }

    /// Install home
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve a path that takes no arguments
    pub fn path(&self, key: InstallPath) -> PathBuf {
        self.path_with(key, &[])
    }

    /// Resolve a path, filling `{0}`, `{1}`, ... from `args`
    pub fn path_with(&self, key: InstallPath, args: &[&str]) -> PathBuf {
        let mut relative = key.template().replace("{server}", &self.server_type);
        for (i, arg) in args.iter().enumerate() {
            relative = relative.replace(&format!("{{{}}}", i), arg);
        }
        let home = to_slash(&self.home);
        PathBuf::from(format!("{}{}", home.trim_end_matches('/'), relative))
    }

    /// Forward-slash rendition of a resolved path, as written into config files
    pub fn display(&self, key: InstallPath) -> String {
        to_slash(&self.path(key))
    }
}

/// Render a path with forward slashes
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
