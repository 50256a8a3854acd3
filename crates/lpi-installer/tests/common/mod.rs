//! Common test infrastructure for lpi-installer tests

#![allow(dead_code)]

use async_trait::async_trait;
use lpi_core::{InstallerSettings, PropertyMap};
use lpi_database::{
    Connection, Credentials, Database, Driver, Error, MySql, Oracle, Result, SqlServer, Vendor,
};
use lpi_fetch::{Downloader, Fetcher};
use lpi_installer::InstallPipeline;
use lpi_servers::{create_server, InstallContext};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

/// In-memory driver: records statements, answers count queries with `count`
#[derive(Clone, Default)]
pub struct FakeDriver {
    pub statements: Arc<Mutex<Vec<String>>>,
    /// `None` makes count queries fail as on a missing schema
    pub count: Option<i64>,
    /// Connections are refused as by a database that is down
    pub refuse: bool,
}

impl FakeDriver {
    pub fn empty_database() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn with_users(count: i64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

struct FakeConnection {
    driver: FakeDriver,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.driver.statements.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        self.driver.statements.lock().unwrap().push(sql.to_string());
        self.driver
            .count
            .ok_or_else(|| Error::Sql("Table 'lumisportal.lum_User' doesn't exist".into()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    fn name(&self) -> &str {
        "fake"
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>> {
        if self.refuse {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("Connection refused: {}", credentials.url),
            )));
        }
        Ok(Box::new(FakeConnection {
            driver: self.clone(),
        }))
    }
}

pub const WEB_XML: &str = "<web-app>
\t<context-param>
\t\t<param-name>lumisDataPath</param-name>
\t\t<param-value>/lumisdata</param-value>
\t</context-param>
</web-app>";

pub const PORTAL_CONFIG: &str = "<lumisPortalConfig>
\t<serverId>localhost</serverId>
\t<!-- web root
\t<webRootPath>/www</webRootPath>
\t-->
\t\t<frameworkUrl>http://localhost:8080</frameworkUrl>
</lumisPortalConfig>";

pub const PERSISTENCE_CONFIG: &str = "<hibernate-configuration>
\t<session-factory>
\t\t<!-- MySQL -->
\t\t<!--
\t\t<property name=\"connection.driver_class\">com.mysql.jdbc.Driver</property>
\t\t<property name=\"dialect\">org.hibernate.dialect.MySQLDialect</property>
\t\t<property name=\"connection.username\">lumis</property>
\t\t<property name=\"connection.password\">lumis</property>
\t\t<property name=\"connection.url\">jdbc:mysql://localhost/lumis</property>
\t\t-->
\t</session-factory>
</hibernate-configuration>";

pub const GENERATESQL_SH: &str = r"#!/bin/sh
. setclasspath.sh
printf 'CREATE TABLE lum_User (id INT);\nINSERT INTO lum_User VALUES (1);\n' > db_mysql.sql
";

pub const SETCLASSPATH_SH: &str = r"#!/bin/sh
JAVA_HOME=
CLASSPATH=../www/WEB-INF/lib/mysql-connector-java-5.1.6-bin.jar
";

pub const INITIALIZEPORTAL_SH: &str = r"#!/bin/sh
echo done > initialized.txt
";

/// Portal distribution entries; `None` marks a directory
pub fn portal_entries() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("www/", None),
        ("www/WEB-INF/web.xml", Some(WEB_XML)),
        ("www/WEB-INF/lib/lumisportal.jar", Some("jar")),
        ("www/lumis/portal/client/lumis.js", Some("// lumis")),
        ("www/lumis/portal/page.jsp", Some("<%-- page --%>")),
        ("www/lumis/doc/", None),
        ("www/lumis/doc/index.html", Some("<html/>")),
        ("lumisdata/config/lumisportalconfig.xml", Some(PORTAL_CONFIG)),
        ("lumisdata/config/lumishibernate.cfg.xml", Some(PERSISTENCE_CONFIG)),
        ("setup/generatesql.sh", Some(GENERATESQL_SH)),
        ("setup/setclasspath.sh", Some(SETCLASSPATH_SH)),
        ("setup/initializeportal.sh", Some(INITIALIZEPORTAL_SH)),
    ]
}

pub fn write_zip(path: &Path, entries: &[(&str, Option<&str>)]) -> PathBuf {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default();
    for (name, content) in entries {
        match content {
            Some(content) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            None => zip.add_directory(*name, options).unwrap(),
        }
    }
    zip.finish().unwrap();
    path.to_path_buf()
}

/// A pipeline over a fresh install home with local install files
pub fn pipeline(
    temp: &TempDir,
    server_type: &str,
    overrides: &[(&str, &str)],
    driver: &FakeDriver,
) -> InstallPipeline {
    let dist = temp.path().join("dist");
    let portal_zip = write_zip(&dist.join("lumisportal_7.1.1.140331.zip"), &portal_entries());
    let driver_jar = dist.join("mysql-connector-java-5.1.30.jar");
    std::fs::write(&driver_jar, "driver").unwrap();

    let mut props = PropertyMap::new();
    props.set("install.home", temp.path().join("lumis").to_str().unwrap());
    props.set("portal.install_file", portal_zip.to_str().unwrap());
    props.set("server.type", server_type);
    props.set("server.java_home", "/opt/java/jdk1.7.0");
    props.set("database.driver_file", driver_jar.to_str().unwrap());
    props.set("platform.windows", "false");
    for (key, value) in overrides {
        props.set(*key, *value);
    }
    let settings = InstallerSettings::from_properties(&props).unwrap();

    let fetcher =
        Fetcher::with_downloader(Downloader::with_cache_dir(temp.path().join("cache")).unwrap());
    let vendor = Vendor::from_key(&settings.database.kind).unwrap();
    let ctx = InstallContext::new(settings, vendor, fetcher).with_hostname("web01");

    let db = &ctx.settings.database;
    let fake = Arc::new(driver.clone());
    let database: Box<dyn Database> = match vendor {
        Vendor::MySql => Box::new(MySql::with_driver(db, fake)),
        Vendor::Oracle => Box::new(Oracle::with_driver(db, fake)),
        Vendor::SqlServer => Box::new(SqlServer::with_driver(db, fake)),
    };
    let server = create_server(server_type).unwrap();

    InstallPipeline::new(ctx, database, server)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
