//! JBoss 5 and JBoss 7 family configuration against fixture install trees

mod common;

use common::*;
use lpi_core::patch::backup_path;
use lpi_core::InstallPath;
use lpi_servers::create_server;
use lpi_servers::jboss::sha1_hex;

fn jboss5_tree(fx: &Fixture) {
    write(&fx.server_file("bin/run.conf"), JBOSS5_RUN_CONF);
    write(&fx.server_file("bin/run.conf.bat"), JBOSS5_RUN_CONF_BAT);
    write(&fx.server_file("server/default/conf/login-config.xml"), JBOSS5_LOGIN_CONFIG);
    write(
        &fx.server_file("server/default/conf/bindingservice.beans/META-INF/bindings-jboss-beans.xml"),
        JBOSS5_BINDINGS,
    );
    write(&fx.server_file("server/default/deploy/jbossweb.sar/server.xml"), JBOSS5_SERVER_XML);
    write(&fx.server_file("server/default/lib/xercesImpl.jar"), "xerces");
    write(&fx.server_file("server/default/lib/commons-logging-api.jar"), "logging");
    write(&fx.path(InstallPath::PortalContextLib).join("xalan.jar"), "xalan");
    write(&fx.path(InstallPath::PortalContextLib).join("jta.jar"), "jta");
}

#[tokio::test]
async fn test_jboss5_configure() {
    let fx = Fixture::new(
        "JBOSS5",
        &[("portal.framework_url", "http://localhost:8280/portal")],
    );
    fx.portal();
    jboss5_tree(&fx);

    create_server("JBOSS5").unwrap().configure(&fx.ctx).await.unwrap();

    // libraries
    assert_eq!(read(&fx.server_file("server/default/lib/shared.jar")), "shared");
    assert_eq!(read(&fx.server_file("lib/endorsed/xercesImpl.jar")), "xerces");
    assert_eq!(read(&fx.server_file("lib/endorsed/xalan.jar")), "xalan");
    assert!(!fx.server_file("server/default/lib/xercesImpl.jar").exists());
    assert!(!fx.server_file("server/default/lib/commons-logging-api.jar").exists());
    assert!(!fx.path(InstallPath::PortalContextLib).join("jta.jar").exists());

    let run_conf = read(&fx.server_file("bin/run.conf"));
    assert!(run_conf.starts_with("JAVA_HOME=\"/opt/java/jdk1.7.0\""));
    assert!(run_conf.contains(&format!(
        "JAVA_OPTS=\"-Xms1024m -Xmx1024m -XX:MaxPermSize=256m -Djavax.xml.transform.TransformerFactory=org.apache.xalan.xsltc.trax.SmartTransformerFactoryImpl -Dlumis.portal.lumisDataPath={} -Dorg.jboss.resolver.warning=true\"",
        fx.ctx.data_path()
    )));
    assert_eq!(read(&backup_path(&fx.server_file("bin/run.conf"))), JBOSS5_RUN_CONF);

    let run_conf_bat = read(&fx.server_file("bin/run.conf.bat"));
    assert!(run_conf_bat.starts_with("set \"JAVA_HOME=/opt/java/jdk1.7.0\""));
    assert!(run_conf_bat.contains("set \"JAVA_OPTS=-Xms1024m -Xmx1024m"));

    let login = read(&fx.server_file("server/default/conf/login-config.xml"));
    assert!(login.contains("<application-policy name=\"LumisPortal\">"));
    assert!(login.trim_end().ends_with("</policy>"));

    let bindings = read(
        &fx.server_file("server/default/conf/bindingservice.beans/META-INF/bindings-jboss-beans.xml"),
    );
    assert!(bindings.contains("ports-02"));

    let server_xml = read(&fx.server_file("server/default/deploy/jbossweb.sar/server.xml"));
    assert!(server_xml.contains("emptySessionPath=\"true\" URIEncoding=\"UTF-8\" redirectPort="));
    assert!(server_xml.contains("jvmRoute=\"web01-200\""));

    let datasource = read(&fx.server_file("server/default/deploy/lumisportal-ds.xml"));
    assert!(datasource.contains("<jndi-name>/comp/env/jdbc/portal</jndi-name>"));
    assert!(datasource.contains("<driver-class>com.mysql.jdbc.Driver</driver-class>"));
    assert!(datasource.contains("MySQLValidConnectionChecker"));
    assert!(datasource.contains("<type-mapping>mySQL</type-mapping>"));

    #[cfg(unix)]
    {
        let war = fx.server_file("server/default/deploy/portal.war");
        assert_eq!(std::fs::read_link(&war).unwrap(), fx.path(InstallPath::PortalWww));
    }
}

#[tokio::test]
async fn test_jboss5_unknown_offset_keeps_default_bindings() {
    let fx = Fixture::new("JBOSS5", &[("portal.framework_url", "http://localhost:8150/")]);
    fx.portal();
    jboss5_tree(&fx);

    create_server("JBOSS5").unwrap().configure(&fx.ctx).await.unwrap();

    let bindings = read(
        &fx.server_file("server/default/conf/bindingservice.beans/META-INF/bindings-jboss-beans.xml"),
    );
    assert!(bindings.contains("ports-default"));
}

/// JBoss 7 style server tree; the driver jar lives outside the install home
fn jboss7_fixture(server_type: &str, deploy_as_war: &str) -> (Fixture, tempfile::TempDir) {
    let downloads = tempfile::TempDir::new().unwrap();
    let driver = downloads.path().join("mysql-connector-java-5.1.30.jar");
    write(&driver, "driver");

    let fx = Fixture::new(
        server_type,
        &[
            ("server.deploy_as_war", deploy_as_war),
            ("database.driver_file", driver.to_str().unwrap()),
        ],
    );
    fx.portal();

    write(
        &fx.path(InstallPath::PortalDir)
            .join("lib/jboss71/modules/lumis/jdbc/driver/mysql/main/module.xml"),
        DRIVER_MODULE_XML,
    );
    write(&fx.path(InstallPath::ServerWebDescriptor), "<jboss-web/>");
    write(&backup_path(&fx.path(InstallPath::ServerWebDescriptor)), "<jboss-web/>");

    write(&fx.ctx.path_with(InstallPath::JBossProfileXml, &["standalone"]), STANDALONE_XML);
    write(&fx.ctx.path_with(InstallPath::JBossProfileXml, &["domain"]), DOMAIN_XML);
    write(&fx.path(InstallPath::JBossDomainHostXml), HOST_XML);
    for (profile, conf) in [("standalone", STANDALONE_CONF), ("domain", DOMAIN_CONF)] {
        let path = fx.ctx.path_with(InstallPath::JBossProfileConf, &[profile]);
        write(&path, conf);
        write(&std::path::PathBuf::from(format!("{}.bat", path.display())), conf);
    }

    (fx, downloads)
}

#[tokio::test]
async fn test_jboss7_exploded_deployment() {
    let (fx, _downloads) = jboss7_fixture("JBOSSAS71", "false");

    create_server("JBOSSAS71").unwrap().configure(&fx.ctx).await.unwrap();

    // driver module points at the configured jar, which sits next to it
    let module_xml = fx.ctx.path_with(InstallPath::JBossDriverModuleXml, &["mysql"]);
    assert!(read(&module_xml).contains("<resource-root path=\"mysql-connector-java-5.1.30.jar\"/>"));
    assert_eq!(
        read(&module_xml.parent().unwrap().join("mysql-connector-java-5.1.30.jar")),
        "driver"
    );

    assert!(!fx.path(InstallPath::ServerWebDescriptor).exists());
    assert!(!backup_path(&fx.path(InstallPath::ServerWebDescriptor)).exists());

    let war = fx.ctx.path_with(InstallPath::JBossStandaloneWar, &["ROOT"]);
    assert!(fx.server_file("standalone/deployments/ROOT.war.dodeploy").exists());
    #[cfg(unix)]
    assert_eq!(std::fs::read_link(&war).unwrap(), fx.path(InstallPath::PortalWww));
    assert!(!fx.server_file("domain/data/content").exists());

    let standalone = read(&fx.ctx.path_with(InstallPath::JBossProfileXml, &["standalone"]));
    assert!(!standalone.contains("org.jboss.as.jaxrs"));
    assert!(standalone.contains(&format!(
        "<property name=\"lumis.portal.lumisDataPath\" value=\"{}\"/>",
        fx.ctx.data_path()
    )));
    assert!(standalone.contains("<datasource jndi-name=\"java:/comp/env/jdbc/portal\""));
    assert!(standalone.contains("<driver>mysql</driver>"));
    assert!(standalone.contains("module=\"lumis.jdbc.driver.mysql\""));
    assert!(standalone.contains("<module name=\"lumis.portal\" slot=\"main\"/>"));
    assert!(standalone.contains("enable-welcome-root=\"false\""));
    assert!(!standalone.contains("{{"));

    let domain = read(&fx.ctx.path_with(InstallPath::JBossProfileXml, &["domain"]));
    assert!(!domain.contains("<system-properties>"));
    assert!(!domain.contains("main-server-group"));
    assert!(domain.contains("<heap size=\"1024m\" max-size=\"1024m\"/>"));
    assert!(domain.contains("<deployment name=\"ROOT.war\" runtime-name=\"ROOT.war\"/>"));

    let host = read(&fx.path(InstallPath::JBossDomainHostXml));
    assert!(host.contains("<server name=\"lumis-server-one\" group=\"lumis-server-group\">"));
    assert!(!host.contains("\"server-one\""));
    assert_eq!(read(&backup_path(&fx.path(InstallPath::JBossDomainHostXml))), HOST_XML);

    // only the standalone launcher gets the configured JVM options
    let standalone_conf = read(&fx.ctx.path_with(InstallPath::JBossProfileConf, &["standalone"]));
    assert!(standalone_conf.starts_with("JAVA_HOME=\"/opt/java/jdk1.7.0\""));
    assert!(standalone_conf.contains("JAVA_OPTS=\"-Xms1024m -Xmx1024m -XX:MaxPermSize=256m -Djava.net.preferIPv4Stack=true\""));
    let domain_conf = read(&fx.ctx.path_with(InstallPath::JBossProfileConf, &["domain"]));
    assert!(domain_conf.contains("-Xms64m -Xmx512m"));
    let domain_bat = read(&std::path::PathBuf::from(format!(
        "{}.bat",
        fx.ctx.path_with(InstallPath::JBossProfileConf, &["domain"]).display()
    )));
    assert!(domain_bat.starts_with("set \"JAVA_HOME=/opt/java/jdk1.7.0\""));
}

#[tokio::test]
async fn test_jboss7_war_deployment_links_domain_content() {
    let (fx, _downloads) = jboss7_fixture("JBOSSEAP6", "true");

    create_server("JBOSSEAP6").unwrap().configure(&fx.ctx).await.unwrap();

    let archive = fx.path(InstallPath::WebArchive);
    assert!(archive.is_file());
    assert!(!fx.path(InstallPath::PortalWww).exists());

    let hash = sha1_hex(&archive).unwrap();
    assert_eq!(hash.len(), 40);
    let content = fx.ctx.path_with(InstallPath::JBossDomainWar, &[&hash[..2], &hash[2..]]);
    #[cfg(unix)]
    {
        assert_eq!(std::fs::read_link(&content).unwrap(), archive);
        let war = fx.ctx.path_with(InstallPath::JBossStandaloneWar, &["ROOT"]);
        assert_eq!(std::fs::read_link(&war).unwrap(), archive);
    }

    let domain = read(&fx.ctx.path_with(InstallPath::JBossProfileXml, &["domain"]));
    assert!(domain.contains(&format!("<content sha1=\"{}\"/>", hash)));
}

#[tokio::test]
async fn test_jboss7_missing_profile_fails() {
    let (fx, _downloads) = jboss7_fixture("JBOSSAS71", "false");
    std::fs::remove_file(fx.ctx.path_with(InstallPath::JBossProfileXml, &["domain"])).unwrap();

    let err = create_server("JBOSSAS71")
        .unwrap()
        .configure(&fx.ctx)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("domain"));
}
