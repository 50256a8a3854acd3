//! JBoss AS 7.1 and JBoss EAP 6
//!
//! Both ship a `standalone` and a `domain` profile. Each profile file is
//! patched with the portal's subsystems and deployments, then rendered.

use crate::common;
use crate::context::InstallContext;
use crate::traits::ApplicationServer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lpi_core::templates::xml_escape;
use lpi_core::{fs, patch, InstallPath, PatchRecipe, Resource, TemplateScope};
use regex::Regex;
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use tracing::info;

pub const JBOSSAS71: &str = "JBOSSAS71";
pub const JBOSSEAP6: &str = "JBOSSEAP6";

/// Server profiles patched by the installer
pub const PROFILES: [&str; 2] = ["standalone", "domain"];

/// Module tree shipped with the portal, relative to the portal dir
const PORTAL_MODULES: &str = "lib/jboss71/modules";

/// Driver jar named by the stock driver module descriptor
const MODULE_DRIVER_PLACEHOLDER: &str = "mysql-connector-java-X.X.X-bin.jar";

/// JBoss 7 family member
#[derive(Debug, Clone, Copy)]
pub struct JBoss {
    key: &'static str,
    /// JVM options of the stock `standalone.conf`
    stock_java_opts: &'static str,
}

impl JBoss {
    pub fn as71() -> Self {
        Self {
            key: JBOSSAS71,
            stock_java_opts: "-Xms64m -Xmx512m -XX:MaxPermSize=256m",
        }
    }

    pub fn eap6() -> Self {
        Self {
            key: JBOSSEAP6,
            stock_java_opts: "-Xms1303m -Xmx1303m -XX:MaxPermSize=256m",
        }
    }

    pub fn stock_java_opts(&self) -> &'static str {
        self.stock_java_opts
    }
}

#[async_trait]
impl ApplicationServer for JBoss {
    fn key(&self) -> &'static str {
        self.key
    }

    async fn copy_portal_files(&self, ctx: &InstallContext) -> Result<()> {
        info!("- Copying portal modules");
        fs::copy_dir(
            &ctx.path(InstallPath::PortalDir).join(PORTAL_MODULES),
            &ctx.path(InstallPath::JBossModules),
        )?;
        configure_driver_module(ctx).await?;
        remove_server_web_descriptor(ctx)
    }

    async fn configure_server(&self, ctx: &InstallContext) -> Result<()> {
        let content_hash = configure_deployment(ctx)?;
        configure_profiles(ctx, content_hash)?;
        configure_host_xml(ctx)?;
        configure_profile_conf(ctx, self.stock_java_opts)
    }
}

async fn configure_driver_module(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring driver module");
    let driver = ctx
        .fetcher
        .materialize(&ctx.settings.database.driver_file)
        .await?;
    let driver_name = driver
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid driver file {}", driver.display()))?
        .to_string();

    let vendor = ctx.vendor.key().to_lowercase();
    let module_xml = ctx.path_with(InstallPath::JBossDriverModuleXml, &[&vendor]);
    common::rewrite_lines(&module_xml, |line| {
        line.replace(MODULE_DRIVER_PLACEHOLDER, &driver_name)
    })?;

    if let Some(module_dir) = module_xml.parent() {
        fs::copy_file(&driver, &module_dir.join(&driver_name))?;
    }
    Ok(())
}

fn remove_server_web_descriptor(ctx: &InstallContext) -> Result<()> {
    let descriptor = ctx.path(InstallPath::ServerWebDescriptor);
    if descriptor.exists() {
        info!("- Removing jboss-web.xml");
        fs::remove_path(&descriptor)?;
        fs::remove_path(&patch::backup_path(&descriptor))?;
    }
    Ok(())
}

/// Link the portal into the deployment scanner and, for web archives, into
/// the domain content repository; returns the archive's SHA-1
fn configure_deployment(ctx: &InstallContext) -> Result<Option<String>> {
    info!("- Configuring deployment");
    let context_name = ctx.context_name();
    let war = ctx.path_with(InstallPath::JBossStandaloneWar, &[&context_name]);
    common::link_context_root(ctx, &war)?;

    let marker = PathBuf::from(format!("{}.dodeploy", war.display()));
    std::fs::write(&marker, "").with_context(|| format!("Failed to create {}", marker.display()))?;

    if !ctx.deploy_as_war() {
        return Ok(None);
    }

    let hash = sha1_hex(&ctx.context_root())?;
    let (head, tail) = hash.split_at(2);
    let content = ctx.path_with(InstallPath::JBossDomainWar, &[head, tail]);
    common::link_context_root(ctx, &content)?;
    Ok(Some(hash))
}

/// Lower-case hex SHA-1 of a file
pub fn sha1_hex(path: &Path) -> Result<String> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha1::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Heap and permgen sizes taken from the JVM options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeapSizes {
    pub xms: Option<String>,
    pub xmx: Option<String>,
    pub max_perm_size: Option<String>,
}

pub fn heap_sizes(java_opts: &str) -> HeapSizes {
    let mut sizes = HeapSizes::default();
    for option in java_opts.split(' ') {
        if let Some(value) = option.strip_prefix("-Xms") {
            sizes.xms = Some(value.to_string());
        }
        if let Some(value) = option.strip_prefix("-Xmx") {
            sizes.xmx = Some(value.to_string());
        }
        if let Some(value) = option.strip_prefix("-XX:MaxPermSize=") {
            sizes.max_perm_size = Some(value.to_string());
        }
    }
    sizes
}

/// Configuration snippets inserted into profile files
#[derive(Debug, Clone)]
pub struct ProfileParts {
    pub ee: Vec<String>,
    pub security: Vec<String>,
    pub system_properties: Vec<String>,
    pub datasource: Vec<String>,
    pub driver: Vec<String>,
    pub deployment: Vec<String>,
    pub server_groups: Vec<String>,
}

impl ProfileParts {
    pub fn load() -> lpi_core::Result<Self> {
        Ok(Self {
            ee: Resource::JBossDomainEe.lines()?,
            security: Resource::JBossDomainSecurity.lines()?,
            system_properties: Resource::JBossSystemProperties.lines()?,
            datasource: Resource::JBossDatasource.lines()?,
            driver: Resource::JBossDriver.lines()?,
            deployment: Resource::JBossDeployment.lines()?,
            server_groups: Resource::JBossServerGroups.lines()?,
        })
    }
}

/// Edits wiring the portal into one profile file
///
/// Markers are matched against the stock file; inserted snippets are not
/// scanned again.
pub fn profile_recipe(
    lines: &[String],
    profile: &str,
    parts: &ProfileParts,
) -> lpi_core::Result<PatchRecipe> {
    let mut recipe = PatchRecipe::new();

    for (i, line) in lines.iter().enumerate() {
        if line.contains("jboss:domain:ee") {
            let mut block = parts.ee.clone();
            if line.ends_with("/>") {
                recipe.set_line(i, line.replace("/>", ">"));
                block.push("        </subsystem>".to_string());
            }
            recipe.insert_lines(i + 1, block);
        } else if line.contains("jboss:domain:deployment-scanner") {
            if let Some(next) = lines.get(i + 1) {
                recipe.set_line(i + 1, next.replace("/>", " deployment-timeout=\"300\"/>"));
            }
        } else if line.contains("jboss:domain:jaxrs")
            || line.contains("org.jboss.as.jaxrs")
            || line.contains("org.jboss.as.webservices")
        {
            recipe.remove_line(i);
        } else if line.contains("jboss:domain:webservices") {
            recipe.remove_until_match(i, "</subsystem>");
        } else if line.contains("jboss:domain:security") {
            recipe.insert_lines((i + 2).min(lines.len()), parts.security.clone());
        } else if line.contains("enable-welcome-root=\"true\"") {
            recipe.set_line(
                i,
                line.replace("enable-welcome-root=\"true\"", "enable-welcome-root=\"false\""),
            );
        } else if profile == "standalone" && line.contains("</extensions>") {
            recipe.insert_lines(i + 1, parts.system_properties.clone());
        } else if line.contains("<datasources>") {
            recipe.insert_lines(i + 1, parts.datasource.clone());
        } else if line.contains("<drivers>") {
            recipe.insert_lines(i + 1, parts.driver.clone());
        } else if line.contains("</socket-binding-groups>") {
            recipe.insert_lines(i + 1, parts.deployment.clone());
        } else if line.contains("<server-groups>") {
            recipe.remove_until_match(i, "</server-groups>");
            recipe.insert_lines(i, parts.server_groups.clone());
        }
    }

    Ok(recipe)
}

fn profile_scope(ctx: &InstallContext, content_hash: Option<String>) -> TemplateScope {
    let database = &ctx.settings.database;
    let sizes = heap_sizes(&ctx.settings.server.java_opts);

    let mut scope = TemplateScope::new();
    scope
        .set("lumisDataPath", ctx.data_path())
        .set("datasourceName", &ctx.settings.datasource_name)
        .set("databaseURL", xml_escape(&database.url))
        .set("databaseType", ctx.vendor.key().to_lowercase())
        .set("databaseClassname", ctx.vendor.driver_class())
        .set("databaseUsername", xml_escape(&database.user))
        .set("databasePassword", xml_escape(&database.password))
        .set("contextName", ctx.context_name())
        .set_opt("contextSha1", content_hash)
        .set_opt("Xms", sizes.xms)
        .set_opt("Xmx", sizes.xmx)
        .set_opt("MaxPermSize", sizes.max_perm_size);
    scope
}

fn configure_profiles(ctx: &InstallContext, content_hash: Option<String>) -> Result<()> {
    info!("- Configuring profiles");
    let parts = ProfileParts::load()?;
    let scope = profile_scope(ctx, content_hash);

    for profile in PROFILES {
        let path = ctx.path_with(InstallPath::JBossProfileXml, &[profile]);
        common::patch_and_render(&path, &scope, |lines| profile_recipe(lines, profile, &parts))
            .with_context(|| format!("Failed to configure profile {}", profile))?;
    }
    Ok(())
}

/// Replace the `<servers>` block of `host.xml`
pub fn host_recipe(lines: &[String], servers: &[String]) -> PatchRecipe {
    let mut recipe = PatchRecipe::new();
    for (i, line) in lines.iter().enumerate() {
        if line.contains("<servers>") {
            recipe.remove_until_match(i, "</servers>");
            recipe.insert_lines(i, servers.to_vec());
        }
    }
    recipe
}

fn configure_host_xml(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring host.xml");
    let servers = Resource::JBossServers.lines()?;
    let scope = TemplateScope::new().with("lumisDataPath", ctx.data_path());
    common::patch_and_render(&ctx.path(InstallPath::JBossDomainHostXml), &scope, |lines| {
        Ok(host_recipe(lines, &servers))
    })
}

/// Profile launch config line with java home and JVM options templated
pub fn profile_conf_line(line: &str, java_home_line: &str, stock_opts: Option<&Regex>) -> String {
    if line.contains("JAVA_HOME=") {
        return java_home_line.to_string();
    }
    match stock_opts {
        Some(re) => re.replace_all(line, "{{javaOpts}}").into_owned(),
        None => line.to_string(),
    }
}

fn configure_profile_conf(ctx: &InstallContext, stock_java_opts: &str) -> Result<()> {
    info!("- Configuring launch settings");
    let stock_opts = Regex::new(&format!("(?i){}", regex::escape(stock_java_opts)))?;
    let scope = TemplateScope::new()
        .with("javaOpts", &ctx.settings.server.java_opts)
        .with("javaHome", ctx.java_home());

    for profile in PROFILES {
        let conf = ctx.path_with(InstallPath::JBossProfileConf, &[profile]);
        let conf_bat = PathBuf::from(format!("{}.bat", conf.display()));
        // JVM options are only rewritten for the standalone launcher
        let opts = (profile == "standalone").then_some(&stock_opts);

        for path in [conf, conf_bat] {
            let java_home = common::java_home_line(&path);
            common::patch_and_render(&path, &scope, |lines| {
                let mut recipe = PatchRecipe::new();
                for (i, line) in lines.iter().enumerate() {
                    let rewritten = profile_conf_line(line, java_home, opts);
                    if rewritten != *line {
                        recipe.set_line(i, rewritten);
                    }
                }
                Ok(recipe)
            })
            .with_context(|| format!("Failed to configure {}", path.display()))?;
        }
    }
    Ok(())
}
