//! JBoss AS 5.1
//!
//! Embeds Tomcat, so the connector and engine edits are shared with the
//! Tomcat variant, but the descriptors live under the `default` server
//! profile and ports shift through the binding service.

use crate::common;
use crate::context::InstallContext;
use crate::tomcat;
use crate::traits::ApplicationServer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lpi_core::templates::xml_escape;
use lpi_core::{fs, InstallPath, PatchRecipe, Resource, TemplateScope};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const KEY: &str = "JBOSS5";

/// Connector attributes inserted ahead of `redirectPort=`
pub const CONNECTOR_ATTRIBUTES: &str =
    "maxPostSize=\"2097152\" emptySessionPath=\"true\" URIEncoding=\"UTF-8\" redirectPort=";

const SHARED_DIR: &str = "server/default/lib";
const ENDORSED_DIR: &str = "lib/endorsed";
const LOGIN_CONFIG: &str = "server/default/conf/login-config.xml";
const BINDINGS: &str = "server/default/conf/bindingservice.beans/META-INF/bindings-jboss-beans.xml";
const SERVER_XML: &str = "server/default/deploy/jbossweb.sar/server.xml";
const DEPLOY_DIR: &str = "server/default/deploy";
const DATASOURCE: &str = "server/default/deploy/lumisportal-ds.xml";

const BINDING_SET: &str = "jboss.service.binding.set:ports-default";
/// Offsets with a predefined binding set (`ports-01` .. `ports-03`)
const BINDING_OFFSETS: &[i32] = &[100, 200, 300];

static STOCK_JAVA_OPTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-Xms128m -Xmx512m -XX:MaxPermSize=256m").expect("java opts regex is valid")
});

const RUN_CONF_JAVA_OPTS: &str = "{{javaOpts}} -Djavax.xml.transform.TransformerFactory=org.apache.xalan.xsltc.trax.SmartTransformerFactoryImpl -Dlumis.portal.lumisDataPath={{lumisDataPath}}";

#[derive(Debug, Default, Clone, Copy)]
pub struct JBoss5;

impl JBoss5 {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ApplicationServer for JBoss5 {
    fn key(&self) -> &'static str {
        KEY
    }

    async fn copy_portal_files(&self, ctx: &InstallContext) -> Result<()> {
        tomcat::copy_libraries(ctx, SHARED_DIR, ENDORSED_DIR)?;
        resolve_library_conflicts(ctx)
    }

    async fn configure_server(&self, ctx: &InstallContext) -> Result<()> {
        configure_run_conf(ctx)?;
        configure_login_config(ctx)?;
        configure_binding_port(ctx)?;
        configure_server_xml(ctx)?;
        configure_deployment(ctx)?;
        configure_datasource(ctx)
    }
}

/// XML libraries move to the endorsed dir; duplicates of server jars go
fn resolve_library_conflicts(ctx: &InstallContext) -> Result<()> {
    let context_lib = ctx.path(InstallPath::PortalContextLib);
    let moved: [PathBuf; 3] = [
        ctx.server_file("server/default/lib/xercesImpl.jar"),
        context_lib.join("serializer.jar"),
        context_lib.join("xalan.jar"),
    ];
    let deleted: [PathBuf; 3] = [
        ctx.server_file("server/default/lib/commons-logging-api.jar"),
        context_lib.join("jboss-common-core-2.2.0.GA.jar"),
        context_lib.join("jta.jar"),
    ];

    let endorsed = ctx.server_file(ENDORSED_DIR);
    for from in &moved {
        let Some(name) = from.file_name() else {
            continue;
        };
        if from.exists() {
            fs::move_file(from, &endorsed.join(name))?;
        } else {
            debug!("Nothing to move, {} does not exist", from.display());
        }
    }
    for file in &deleted {
        fs::remove_path(file)?;
    }
    Ok(())
}

/// `run.conf` line with java home and JVM options templated
pub fn run_conf_line(line: &str, java_home_line: &str) -> String {
    if line.contains("JAVA_HOME=") {
        java_home_line.to_string()
    } else {
        STOCK_JAVA_OPTS_RE
            .replace_all(line, RUN_CONF_JAVA_OPTS)
            .into_owned()
    }
}

fn configure_run_conf(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring run.conf");
    let scope = TemplateScope::new()
        .with("javaOpts", &ctx.settings.server.java_opts)
        .with("javaHome", ctx.java_home())
        .with("lumisDataPath", ctx.data_path());

    let conf = ctx.path_with(InstallPath::JBossProfileConf, &["run"]);
    let conf_bat = PathBuf::from(format!("{}.bat", conf.display()));
    for path in [conf, conf_bat] {
        let java_home = common::java_home_line(&path);
        common::patch_and_render(&path, &scope, |lines| {
            let mut recipe = PatchRecipe::new();
            for (i, line) in lines.iter().enumerate() {
                let rewritten = run_conf_line(line, java_home);
                if rewritten != *line {
                    recipe.set_line(i, rewritten);
                }
            }
            Ok(recipe)
        })
        .with_context(|| format!("Failed to configure {}", path.display()))?;
    }
    Ok(())
}

/// Application policy block placed ahead of `</policy>`
fn application_policy() -> Vec<String> {
    [
        "  <application-policy name=\"LumisPortal\">",
        "    <authentication>",
        "      <login-module code=\"lumis.portal.authentication.LumisLoginModule\" flag=\"sufficient\"/>",
        "    </authentication>",
        "  </application-policy>",
        "",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Insert the portal's application policy before every `</policy>`
pub fn login_config_recipe(lines: &[String]) -> PatchRecipe {
    let mut recipe = PatchRecipe::new();
    for (i, line) in lines.iter().enumerate() {
        if line.trim().eq_ignore_ascii_case("</policy>") {
            recipe.insert_lines(i, application_policy());
        }
    }
    recipe
}

fn configure_login_config(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring login-config.xml");
    lpi_core::patch::patch_file(&ctx.server_file(LOGIN_CONFIG), |lines| {
        Ok(login_config_recipe(lines))
    })?;
    Ok(())
}

/// Binding set line for `offset`; unchanged unless the offset has a set
pub fn binding_line(line: &str, offset: i32) -> String {
    if line.contains(BINDING_SET) && BINDING_OFFSETS.contains(&offset) {
        line.replace("default", &format!("0{}", offset / 100))
    } else {
        line.to_string()
    }
}

fn configure_binding_port(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring binding port");
    let offset = ctx.port_offset();
    common::rewrite_lines(&ctx.server_file(BINDINGS), |line| binding_line(line, offset))?;
    Ok(())
}

fn configure_server_xml(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring server.xml");
    let node_id = ctx.node_id();
    common::rewrite_lines(&ctx.server_file(SERVER_XML), |line| {
        common::rewrite_connector(line, CONNECTOR_ATTRIBUTES, &node_id)
    })?;
    Ok(())
}

fn configure_deployment(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring deployment");
    let war = ctx
        .server_file(DEPLOY_DIR)
        .join(format!("{}.war", ctx.context_name()));
    common::link_context_root(ctx, &war)
}

fn configure_datasource(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring datasource");
    let database = &ctx.settings.database;

    let mut scope = TemplateScope::new();
    scope
        .set("datasourceName", ctx.settings.datasource_name.replace("java:", ""))
        .set("driverClass", ctx.vendor.driver_class())
        .set("databaseURL", xml_escape(&database.url))
        .set("databaseUsername", xml_escape(&database.user))
        .set("databasePassword", xml_escape(&database.password))
        .set("connectionValidator", ctx.vendor.jboss5_validator())
        .set("databaseType", ctx.vendor.jboss5_type());

    common::render_to(Resource::JBoss5Datasource, &scope, &ctx.server_file(DATASOURCE))
}
