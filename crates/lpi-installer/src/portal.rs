//! The portal role
//!
//! Extraction unpacks the portal distribution into the portal directory.
//! Configuration mirrors static assets, points the descriptors and the
//! portal config at this install, prepares the setup scripts, activates the
//! database connection and, on a fresh schema, populates and initializes it.

use anyhow::{Context, Result};
use lpi_core::command::run_command;
use lpi_core::templates::xml_escape;
use lpi_core::{fs, patch, InstallPath, PatchRecipe, Resource, TemplateScope};
use lpi_database::{Database, ScriptReport};
use lpi_servers::common::{render_to, rewrite_lines};
use lpi_servers::InstallContext;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Entries skipped on extraction unless documentation is requested
pub const DOC_IGNORE_PATTERN: &str = "www/lumis/doc.*";

/// Documentation tree, relative to the portal directory
const DOC_DIR: &str = "www/lumis/doc";

/// Extensions of the setup scripts rewritten for this install
const SETUP_SCRIPT_EXTENSIONS: &[&str] = &["sh", "cmd", "bat"];

/// Connector jar referenced by the stock setup scripts
const DRIVER_REFERENCE: &str = "mysql-connector-java";

/// Suffix of the persistence config holding the direct connection
const CONNECTION_SUFFIX: &str = ".connection";
/// Suffix of the persistence config using the container datasource
const DATASOURCE_SUFFIX: &str = ".datasource";

/// The portal web application
#[derive(Debug, Default, Clone, Copy)]
pub struct Portal;

impl Portal {
    pub fn new() -> Self {
        Self
    }

    /// Unpack the portal archive into the portal directory
    pub async fn extract(&self, ctx: &InstallContext) -> Result<usize> {
        let ignore = (!ctx.settings.portal.extract_doc).then_some(DOC_IGNORE_PATTERN);
        ctx.fetcher
            .extract(
                &ctx.settings.portal.install_file,
                &ctx.path(InstallPath::PortalDir),
                ignore,
                false,
            )
            .await
            .with_context(|| format!("Failed to extract {}", ctx.settings.portal.install_file))
    }

    /// Wire the extracted portal to this install and its database
    pub async fn configure(&self, ctx: &InstallContext, database: &dyn Database) -> Result<()> {
        configure_htdocs(ctx)?;
        configure_web_descriptor(ctx)?;
        configure_server_web_descriptor(ctx)?;
        configure_portal_config(ctx)?;
        configure_setup_files(ctx).await?;

        info!("- Installing database {}", database.key());
        database.install().await?;

        configure_persistence(ctx, database)?;
        initialize(ctx, database).await
    }
}

/// Mirror the static assets into htdocs, leaving out docs and JSPs
fn configure_htdocs(ctx: &InstallContext) -> Result<usize> {
    info!("- Configuring htdocs");
    let portal_dir = ctx.path(InstallPath::PortalDir);
    let assets = ctx.path(InstallPath::PortalStatic);
    let htdocs = ctx.path(InstallPath::HtdocsStatic);
    if !assets.is_dir() {
        warn!("No static assets at {}", assets.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(&assets).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let portal_relative = fs::to_slash(entry.path().strip_prefix(&portal_dir)?);
        if !is_published_asset(&portal_relative) {
            continue;
        }
        let target = htdocs.join(entry.path().strip_prefix(&assets)?);
        fs::copy_file(entry.path(), &target)?;
        copied += 1;
    }

    info!("  +- {} static files published", copied);
    Ok(copied)
}

/// Whether a file under the portal directory is served from htdocs
pub fn is_published_asset(portal_relative: &str) -> bool {
    !portal_relative.starts_with(DOC_DIR) && !portal_relative.ends_with(".jsp")
}

/// The line after each `lumisDataPath` mention carries the data path
pub fn web_descriptor_recipe(lines: &[String], data_path: &str) -> PatchRecipe {
    let mut recipe = PatchRecipe::new();
    for (i, line) in lines.iter().enumerate() {
        if line.contains("lumisDataPath") && i + 1 < lines.len() {
            recipe.set_line(i + 1, format!("\t\t<param-value>{}</param-value>", data_path));
        }
    }
    recipe
}

fn configure_web_descriptor(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring web.xml");
    let data_path = xml_escape(&ctx.data_path());
    patch::patch_file(&ctx.path(InstallPath::WebDescriptor), |lines| {
        Ok(web_descriptor_recipe(lines, &data_path))
    })?;
    Ok(())
}

fn configure_server_web_descriptor(ctx: &InstallContext) -> Result<()> {
    let path = ctx.path(InstallPath::ServerWebDescriptor);
    if !path.exists() {
        return Ok(());
    }
    info!("- Configuring jboss-web.xml");
    let context_name = ctx.context_name();
    rewrite_lines(&path, |line| line.replace("myapp", &context_name))?;
    Ok(())
}

/// Values written into `lumisportalconfig.xml`
#[derive(Debug, Clone)]
pub struct PortalConfigValues {
    pub server_id: String,
    pub framework_url: String,
    pub web_root: String,
}

/// Rewrite `lumisportalconfig.xml` in place
///
/// Edits land on neighbouring lines too, and later lines are matched
/// against the already edited text.
pub fn rewrite_portal_config(lines: &mut [String], values: &PortalConfigValues) {
    for i in 0..lines.len() {
        let line = lines[i].clone();

        if line.contains("<serverId>") {
            lines[i] = format!("\t<serverId>{}</serverId>", values.server_id);
        } else if line.contains("<frameworkUrl>") {
            lines[i] = format!("\t\t<frameworkUrl>{}</frameworkUrl>", values.framework_url);
        } else if line.contains("<webRootPath>") {
            close_comment_before(lines, i);
            lines[i] = format!("\t<webRootPath>{}</webRootPath>", values.web_root);
            if let Some(next) = lines.get_mut(i + 1) {
                next.clear();
            }
        } else if line.contains("</layoutFile>") && i >= 2 {
            lines[i - 2] = "\t\t-->".to_string();
            lines[i - 1] = "\t\t<pollIntervalSecs>300</pollIntervalSecs>".to_string();
        }

        if line.contains("<htmlGeneration>") {
            close_comment_before(lines, i);
        } else if line.contains("</htmlGeneration>") {
            if let Some(next) = lines.get_mut(i + 1) {
                next.clear();
            }
        }
    }
}

fn close_comment_before(lines: &mut [String], i: usize) {
    if let Some(previous) = i.checked_sub(1).and_then(|p| lines.get_mut(p)) {
        if !previous.ends_with("-->") {
            previous.push_str(" -->");
        }
    }
}

fn configure_portal_config(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring lumisportalconfig.xml");
    let path = ctx.path(InstallPath::PortalConfig);
    let framework_url = ctx.settings.portal.framework_url.as_str();
    let values = PortalConfigValues {
        server_id: ctx.node_id(),
        framework_url: xml_escape(framework_url.trim_end_matches('/')),
        web_root: xml_escape(&ctx.paths.display(InstallPath::Htdocs)),
    };

    let mut lines = patch::load(&path)?;
    rewrite_portal_config(&mut lines, &values);
    patch::save(&path, &lines)?;
    Ok(())
}

/// Setup script line pointed at this install's java home and driver
pub fn setup_script_line(line: &str, java_home: &str, driver_name: &str) -> String {
    let mut line = line.replace("JAVA_HOME=", &format!("JAVA_HOME={}", java_home));
    line = line.replace(". setclasspath.sh", ". ./setclasspath.sh");
    if let Some(start) = line.find(DRIVER_REFERENCE) {
        line.replace_range(start.., driver_name);
    }
    line
}

async fn configure_setup_files(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring setup files");
    let driver = ctx
        .fetcher
        .materialize(&ctx.settings.database.driver_file)
        .await?;
    let driver_name = driver
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid driver file {}", driver.display()))?
        .to_string();
    fs::copy_file(
        &driver,
        &ctx.path(InstallPath::PortalContextLib).join(&driver_name),
    )?;

    let java_home = ctx.java_home();
    let setup = ctx.path(InstallPath::PortalSetup);
    for script in fs::files_with_extensions(&setup, SETUP_SCRIPT_EXTENSIONS)? {
        rewrite_lines(&script, |line| setup_script_line(line, &java_home, &driver_name))?;
        fs::set_executable(&script)?;
    }
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the connection and datasource renditions of the persistence config
/// and activate the connection one
fn configure_persistence(ctx: &InstallContext, database: &dyn Database) -> Result<()> {
    info!("- Configuring lumishibernate.cfg.xml");
    let config = ctx.path(InstallPath::PersistenceConfig);
    let connection = sibling(&config, CONNECTION_SUFFIX);
    let datasource = sibling(&config, DATASOURCE_SUFFIX);

    let lines = patch::load(&config)?;
    let patched = database.persistence_recipe(&lines)?.apply(&lines)?;
    patch::save(&connection, &patched)?;

    let scope = TemplateScope::new().with("datasourceName", xml_escape(&ctx.settings.datasource_name));
    render_to(Resource::PersistenceDatasource, &scope, &datasource)?;

    fs::copy_file(&connection, &config)?;
    Ok(())
}

/// Whether the portal still needs its initialization command
///
/// A present schema needs it only while it has no users. A missing schema
/// is generated and populated first; any statement reaching the database
/// schedules initialization, even when the script stopped on a failure.
pub fn needs_initialization(probe: Option<i64>, report: Option<&ScriptReport>) -> bool {
    match (probe, report) {
        (Some(count), _) => count == 0,
        (None, Some(report)) => report.attempted() > 0,
        (None, None) => false,
    }
}

fn setup_command(ctx: &InstallContext, script: &str) -> String {
    if ctx.windows() {
        format!("cmd /c {}.cmd", script)
    } else {
        format!("./{}.sh", script)
    }
}

async fn initialize(ctx: &InstallContext, database: &dyn Database) -> Result<()> {
    let setup = ctx.path(InstallPath::PortalSetup);

    // An unreachable database fails here, before anything is generated
    let (probe, report) = match database.probe().await? {
        Some(count) => {
            info!("- Portal schema found with {} users", count);
            (Some(count), None)
        }
        None => {
            info!("- Portal schema not found, generating it");
            run_command(&setup_command(ctx, "generatesql"), &setup).await?;
            let script = setup.join(database.vendor().script_name());
            let report = database.execute_script(&script).await?;
            if let Some(failure) = &report.failure {
                warn!(
                    "Script {} stopped at statement {}: {}",
                    script.display(),
                    failure.index,
                    failure.message
                );
            }
            (None, Some(report))
        }
    };

    if needs_initialization(probe, report.as_ref()) {
        info!("- Initializing portal");
        run_command(&setup_command(ctx, "initializeportal"), &setup).await?;
    }
    Ok(())
}
