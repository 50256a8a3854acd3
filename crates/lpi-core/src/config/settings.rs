//! Typed settings read from the property map

use super::PropertyMap;
use crate::error::{Error, Result};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_PORTAL_INSTALL_FILE: &str = "./lumisportal_7.1.1.140331.zip";
pub const DEFAULT_FRAMEWORK_URL: &str = "http://localhost:8080";
pub const DEFAULT_SERVER_TYPE: &str = "TOMCAT7";
pub const DEFAULT_SERVER_INSTALL_FILE: &str =
    "http://central.maven.org/maven2/org/apache/tomcat/tomcat/7.0.50/tomcat-7.0.50.zip";
pub const DEFAULT_JAVA_OPTS: &str = "-Xms1024m -Xmx1024m -XX:MaxPermSize=256m";
pub const DEFAULT_DRIVER_FILE: &str =
    "http://central.maven.org/maven2/mysql/mysql-connector-java/5.1.30/mysql-connector-java-5.1.30.jar";
pub const DEFAULT_DATABASE_USER: &str = "lumis";
pub const DEFAULT_DATABASE_PASSWORD: &str = "lumisEIP";
pub const DEFAULT_DATABASE_URL: &str =
    "jdbc:mysql://localhost/lumisportal?characterEncoding=UTF-8&zeroDateTimeBehavior=convertToNull";
pub const DEFAULT_DATASOURCE_NAME: &str = "java:/comp/env/jdbc/portal";

/// Port the framework URL offsets are measured from
pub const BASE_HTTP_PORT: i32 = 8080;

/// Known server install files, in the order they are offered in the sample
pub const KNOWN_SERVER_INSTALL_FILES: &[(&str, &str)] = &[
    ("TOMCAT7", DEFAULT_SERVER_INSTALL_FILE),
    (
        "TOMCAT8",
        "http://central.maven.org/maven2/org/apache/tomcat/tomcat/8.0.5/tomcat-8.0.5.zip",
    ),
    ("JBOSS5", "./jboss-5.1.0.GA.zip"),
    (
        "JBOSSAS71",
        "http://download.jboss.org/jbossas/7.1/jboss-as-7.1.1.Final/jboss-as-7.1.1.Final.zip",
    ),
    ("JBOSSEAP6", "./jboss-eap-6.2.0.zip"),
];

/// Install file used when `server.install_file` is not set
pub fn default_server_install_file(server_type: &str) -> &'static str {
    KNOWN_SERVER_INSTALL_FILES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(server_type))
        .map(|(_, file)| *file)
        .unwrap_or(DEFAULT_SERVER_INSTALL_FILE)
}

/// Derive the database registry key from a JDBC URL
///
/// `jdbc:mysql://...` gives `MYSQL`; the jTDS driver is the SQL Server
/// variant, so `jdbc:jtds:sqlserver://...` gives `SQLSERVER`.
pub fn derive_database_type(url: &str) -> Option<String> {
    let vendor = url.split(':').nth(1)?.trim();
    if vendor.is_empty() {
        return None;
    }
    let vendor = vendor.to_ascii_uppercase();
    Some(if vendor == "JTDS" {
        "SQLSERVER".to_string()
    } else {
        vendor
    })
}

/// Portal settings
#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub install_file: String,
    pub extract_doc: bool,
    pub framework_url: Url,
}

impl PortalSettings {
    /// Offset of the framework port from 8080; every server port shifts by it
    pub fn port_offset(&self) -> i32 {
        self.framework_url
            .port_or_known_default()
            .map(|port| i32::from(port) - BASE_HTTP_PORT)
            .unwrap_or(0)
    }

    /// Framework URL path without its leading `/`
    pub fn context_path(&self) -> String {
        let path = self.framework_url.path();
        path.strip_prefix('/').unwrap_or(path).to_string()
    }

    /// Web context name; the root context deploys as `ROOT`
    pub fn context_name(&self) -> String {
        let path = self.context_path();
        if path.is_empty() {
            "ROOT".to_string()
        } else {
            path
        }
    }
}

/// Application server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub kind: String,
    pub install_file: String,
    pub java_opts: String,
    pub deploy_as_war: bool,
    pub java_home: String,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub kind: String,
    pub driver_file: String,
    pub user: String,
    pub password: String,
    pub url: String,
}

impl DatabaseSettings {
    /// Password with every character masked
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

/// Everything the installer reads from the property map
#[derive(Debug, Clone)]
pub struct InstallerSettings {
    /// Install home, root of the path table
    pub home: PathBuf,
    pub datasource_name: String,
    pub windows: bool,
    pub portal: PortalSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

impl InstallerSettings {
    /// Read settings from the property map, applying defaults
    pub fn from_properties(props: &PropertyMap) -> Result<Self> {
        let framework_url = props.get_or("portal.framework_url", DEFAULT_FRAMEWORK_URL);
        let framework_url = Url::parse(framework_url)
            .map_err(|e| Error::invalid_property("portal.framework_url", e.to_string()))?;

        let server_kind = props
            .get_or("server.type", DEFAULT_SERVER_TYPE)
            .trim()
            .to_ascii_uppercase();
        let server_install_file = props
            .get("server.install_file")
            .map(str::to_string)
            .unwrap_or_else(|| default_server_install_file(&server_kind).to_string());
        let java_home = match props.get("server.java_home") {
            Some(home) => home.to_string(),
            None => std::env::var("JAVA_HOME").unwrap_or_default(),
        };

        let database_url = props.get_or("database.url", DEFAULT_DATABASE_URL).to_string();
        let database_kind = match props.get("database.type").filter(|v| !v.trim().is_empty()) {
            Some(kind) => kind.trim().to_ascii_uppercase(),
            None => derive_database_type(&database_url)
                .ok_or_else(|| Error::invalid_property("database.url", database_url.clone()))?,
        };

        // Link targets and config values are built from an absolute home
        let home = PathBuf::from(props.get_or("install.home", "lumis"));
        let home = std::path::absolute(&home).map_err(|e| Error::io(&home, e))?;

        Ok(Self {
            home,
            datasource_name: props
                .get_or("datasource_name", DEFAULT_DATASOURCE_NAME)
                .to_string(),
            windows: props.get_bool("platform.windows", cfg!(windows))?,
            portal: PortalSettings {
                install_file: props
                    .get_or("portal.install_file", DEFAULT_PORTAL_INSTALL_FILE)
                    .to_string(),
                extract_doc: props.get_bool("portal.extract_doc", false)?,
                framework_url,
            },
            server: ServerSettings {
                kind: server_kind,
                install_file: server_install_file,
                java_opts: props
                    .get_or("server.java_opts", DEFAULT_JAVA_OPTS)
                    .to_string(),
                deploy_as_war: props.get_bool("server.deploy_as_war", false)?,
                java_home,
            },
            database: DatabaseSettings {
                kind: database_kind,
                driver_file: props
                    .get_or("database.driver_file", DEFAULT_DRIVER_FILE)
                    .to_string(),
                user: props
                    .get_or("database.user", DEFAULT_DATABASE_USER)
                    .to_string(),
                password: props
                    .get_or("database.password", DEFAULT_DATABASE_PASSWORD)
                    .to_string(),
                url: database_url,
            },
        })
    }

    /// Datasource name as seen by the web container (no `java:/comp/env/`)
    pub fn container_datasource_name(&self) -> String {
        self.datasource_name.replace("java:/comp/env/", "")
    }

    /// Settings echo, one `(key, value)` pair per line, password masked
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("portal.install_file", self.portal.install_file.clone()),
            ("portal.extract_doc", self.portal.extract_doc.to_string()),
            ("portal.framework_url", self.portal.framework_url.to_string()),
            ("server.type", self.server.kind.clone()),
            ("server.install_file", self.server.install_file.clone()),
            ("server.java_opts", self.server.java_opts.clone()),
            ("server.deploy_as_war", self.server.deploy_as_war.to_string()),
            ("database.type", self.database.kind.clone()),
            ("database.driver_file", self.database.driver_file.clone()),
            ("database.user", self.database.user.clone()),
            ("database.password", self.database.masked_password()),
            ("database.url", self.database.url.clone()),
            ("install.home", self.home.display().to_string()),
        ]
    }
}
