//! Apache Tomcat 7 and 8

use crate::common;
use crate::context::InstallContext;
use crate::traits::ApplicationServer;
use anyhow::Result;
use async_trait::async_trait;
use lpi_core::templates::xml_escape;
use lpi_core::{fs, InstallPath, Resource, TemplateScope};
use tracing::info;

pub const TOMCAT7: &str = "TOMCAT7";
pub const TOMCAT8: &str = "TOMCAT8";

/// Connector attributes inserted ahead of `redirectPort=`
pub const CONNECTOR_ATTRIBUTES: &str = "maxPostSize=\"2097152\" URIEncoding=\"UTF-8\" redirectPort=";

const SHUTDOWN_PORT: i32 = 8005;
const AJP_PORT: i32 = 8009;

/// Tomcat; both major versions share one layout
#[derive(Debug, Clone, Copy)]
pub struct Tomcat {
    key: &'static str,
}

impl Tomcat {
    pub fn tomcat7() -> Self {
        Self { key: TOMCAT7 }
    }

    pub fn tomcat8() -> Self {
        Self { key: TOMCAT8 }
    }
}

#[async_trait]
impl ApplicationServer for Tomcat {
    fn key(&self) -> &'static str {
        self.key
    }

    async fn copy_portal_files(&self, ctx: &InstallContext) -> Result<()> {
        copy_libraries(ctx, "lib", "endorsed")
    }

    async fn configure_server(&self, ctx: &InstallContext) -> Result<()> {
        configure_context_xml(ctx)?;
        configure_server_xml(ctx)?;
        configure_setenv(ctx)
    }
}

/// Copy the portal's shared and endorsed libraries into the server
pub fn copy_libraries(ctx: &InstallContext, shared_dir: &str, endorsed_dir: &str) -> Result<()> {
    info!("- Copying portal libraries");
    fs::copy_dir(&ctx.path(InstallPath::PortalSharedLib), &ctx.server_file(shared_dir))?;
    fs::copy_dir(&ctx.path(InstallPath::PortalEndorsedLib), &ctx.server_file(endorsed_dir))?;
    Ok(())
}

fn configure_context_xml(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring context descriptor");
    let database = &ctx.settings.database;

    let mut scope = TemplateScope::new();
    scope
        .set("datasourceName", ctx.settings.container_datasource_name())
        .set("contextName", ctx.context_path())
        .set("contextRoot", lpi_core::paths::to_slash(&ctx.context_root()))
        .set("lumisDataPath", ctx.data_path())
        .set("driverClass", ctx.vendor.driver_class())
        .set("databaseURL", xml_escape(&database.url))
        .set("databaseUsername", xml_escape(&database.user))
        .set("databasePassword", xml_escape(&database.password));

    let path = ctx.path_with(InstallPath::TomcatContextXml, &[&ctx.context_name()]);
    common::render_to(Resource::TomcatContext, &scope, &path)
}

/// `server.xml` line with connector attributes, route and shifted ports
pub fn server_xml_line(line: &str, ctx: &InstallContext) -> String {
    let offset = ctx.port_offset();
    common::rewrite_connector(line, CONNECTOR_ATTRIBUTES, &ctx.node_id())
        .replace("8005", &(SHUTDOWN_PORT - offset).to_string())
        .replace("8080", &ctx.http_port().to_string())
        .replace("8009", &(AJP_PORT - offset).to_string())
}

fn configure_server_xml(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring server.xml");
    common::rewrite_lines(&ctx.path(InstallPath::TomcatServerXml), |line| {
        server_xml_line(line, ctx)
    })?;
    Ok(())
}

fn configure_setenv(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring environment scripts");
    let scope = TemplateScope::new()
        .with("javaOpts", &ctx.settings.server.java_opts)
        .with("javaHome", ctx.java_home())
        .with("lumisDataPath", ctx.data_path());

    common::render_to(
        Resource::TomcatSetenvBat,
        &scope,
        &ctx.path(InstallPath::TomcatSetenvBat),
    )?;
    common::render_to(
        Resource::TomcatSetenvSh,
        &scope,
        &ctx.path(InstallPath::TomcatSetenvSh),
    )
}
