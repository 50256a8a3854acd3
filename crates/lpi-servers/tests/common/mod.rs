//! Common test infrastructure for lpi-servers tests

#![allow(dead_code)]

use lpi_core::{InstallPath, InstallerSettings, PropertyMap};
use lpi_database::Vendor;
use lpi_fetch::{Downloader, Fetcher};
use lpi_servers::InstallContext;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// An install home in a temp dir with a context bound to it
pub struct Fixture {
    pub temp: TempDir,
    pub ctx: InstallContext,
}

impl Fixture {
    pub fn new(server_type: &str, overrides: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        let mut props = PropertyMap::new();
        props.set("install.home", temp.path().join("lumis").to_str().unwrap());
        props.set("server.type", server_type);
        props.set("server.java_home", "/opt/java/jdk1.7.0");
        props.set("platform.windows", "false");
        for (key, value) in overrides {
            props.set(*key, *value);
        }

        let settings = InstallerSettings::from_properties(&props).unwrap();
        let vendor = Vendor::from_key(&settings.database.kind).unwrap();
        let fetcher =
            Fetcher::with_downloader(Downloader::with_cache_dir(temp.path().join("cache")).unwrap());
        let ctx = InstallContext::new(settings, vendor, fetcher).with_hostname("web01");

        Self { temp, ctx }
    }

    pub fn path(&self, key: InstallPath) -> std::path::PathBuf {
        self.ctx.path(key)
    }

    pub fn server_file(&self, relative: &str) -> std::path::PathBuf {
        self.ctx.server_file(relative)
    }

    /// Portal tree as left by extraction
    pub fn portal(&self) {
        write(&self.path(InstallPath::PortalWww).join("index.jsp"), "<%-- portal --%>");
        write(&self.path(InstallPath::WebDescriptor), "<web-app/>");
        write(&self.path(InstallPath::PortalContextLib).join("lumisportal.jar"), "jar");
        write(&self.path(InstallPath::PortalSharedLib).join("shared.jar"), "shared");
        write(&self.path(InstallPath::PortalEndorsedLib).join("endorsed.jar"), "endorsed");
        write(&self.path(InstallPath::PortalData).join("config/lumisportalconfig.xml"), "<config/>");
        write(&self.path(InstallPath::PortalSetup).join("generatesql.sh"), "#!/bin/sh");
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

pub const TOMCAT_SERVER_XML: &str = r#"<Server port="8005" shutdown="SHUTDOWN">
  <Service name="Catalina">
    <Connector port="8080" protocol="HTTP/1.1" connectionTimeout="20000" redirectPort="8443" />
    <Connector port="8009" protocol="AJP/1.3" redirectPort="8443" />
    <Engine name="Catalina" defaultHost="localhost">
    </Engine>
  </Service>
</Server>"#;

pub const JBOSS5_SERVER_XML: &str = r#"<Server>
   <Service name="jboss.web">
      <Connector protocol="HTTP/1.1" port="${jboss.web.http.port}" address="${jboss.bind.address}" redirectPort="${jboss.web.https.port}" />
      <Engine name="jboss.web" defaultHost="localhost">
      </Engine>
   </Service>
</Server>"#;

pub const JBOSS5_RUN_CONF: &str = r#"#JAVA_HOME="/opt/java/jdk"
if [ "x$JAVA_OPTS" = "x" ]; then
   JAVA_OPTS="-Xms128m -Xmx512m -XX:MaxPermSize=256m -Dorg.jboss.resolver.warning=true"
fi"#;

pub const JBOSS5_RUN_CONF_BAT: &str = r#"rem set "JAVA_HOME=C:\opt\jdk1.6.0_23"
set "JAVA_OPTS=-Xms128M -Xmx512M -XX:MaxPermSize=256M""#;

pub const JBOSS5_LOGIN_CONFIG: &str = r#"<policy>
    <application-policy name="other">
    </application-policy>
</policy>"#;

pub const JBOSS5_BINDINGS: &str = r#"<bean name="ServiceBindingManager">
   <parameter>${jboss.service.binding.set:ports-default}</parameter>
</bean>"#;

pub const STANDALONE_XML: &str = r#"<server>
    <extensions>
        <extension module="org.jboss.as.jaxrs"/>
    </extensions>
    <profile>
        <subsystem xmlns="urn:jboss:domain:datasources:1.0">
            <datasources>
                <drivers>
                </drivers>
            </datasources>
        </subsystem>
        <subsystem xmlns="urn:jboss:domain:ee:1.0"/>
        <subsystem xmlns="urn:jboss:domain:web:1.1">
            <virtual-server name="default-host" enable-welcome-root="true">
            </virtual-server>
        </subsystem>
    </profile>
</server>"#;

pub const DOMAIN_XML: &str = r#"<domain>
    <extensions>
    </extensions>
    <profiles>
        <profile name="default">
            <subsystem xmlns="urn:jboss:domain:ee:1.0"/>
        </profile>
    </profiles>
    <socket-binding-groups>
    </socket-binding-groups>
    <server-groups>
        <server-group name="main-server-group" profile="default"/>
    </server-groups>
</domain>"#;

pub const HOST_XML: &str = r#"<host name="master">
    <servers>
        <server name="server-one" group="main-server-group"/>
    </servers>
</host>"#;

pub const STANDALONE_CONF: &str = r#"#JAVA_HOME="/opt/java/jdk"
   JAVA_OPTS="-Xms64m -Xmx512m -XX:MaxPermSize=256m -Djava.net.preferIPv4Stack=true""#;

pub const DOMAIN_CONF: &str = r#"#JAVA_HOME="/opt/java/jdk"
   JAVA_OPTS="-Xms64m -Xmx512m -XX:MaxPermSize=256m""#;

pub const DRIVER_MODULE_XML: &str = r#"<module xmlns="urn:jboss:module:1.1" name="lumis.jdbc.driver.mysql">
    <resources>
        <resource-root path="mysql-connector-java-X.X.X-bin.jar"/>
    </resources>
</module>"#;
