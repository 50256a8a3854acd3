//! Steps every Java application server shares

use crate::context::InstallContext;
use anyhow::{Context, Result};
use lpi_core::templates::{render, render_resource};
use lpi_core::{fs, patch, InstallPath, PatchRecipe, Resource, TemplateScope};
use std::path::Path;
use tracing::{debug, info};

/// Portal directory entries kept after packaging as a web archive
const KEPT_AFTER_PACKAGING: &[&str] = &["lumisdata", "lumisportal.war"];

/// Unpack the server archive into the server directory without its root dir
pub async fn extract_server(ctx: &InstallContext) -> Result<()> {
    let target = ctx.path(InstallPath::ServerDir);
    ctx.fetcher
        .extract(&ctx.settings.server.install_file, &target, None, true)
        .await
        .with_context(|| format!("Failed to extract {}", ctx.settings.server.install_file))?;
    Ok(())
}

/// Pack the portal web root into the web archive
pub async fn package_war(ctx: &InstallContext) -> Result<()> {
    info!("- Creating web archive");
    ctx.fetcher
        .package(&ctx.path(InstallPath::PortalWww), &ctx.path(InstallPath::WebArchive))
        .await?;
    Ok(())
}

/// Delete everything in the portal directory but the data dir and the archive
pub fn clean_portal_dir(ctx: &InstallContext) -> Result<()> {
    info!("- Cleaning portal installation");
    let dir = ctx.path(InstallPath::PortalDir);
    let entries = std::fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        let keep = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| KEPT_AFTER_PACKAGING.contains(&name));
        if !keep {
            fs::remove_path(&path)?;
        }
    }
    Ok(())
}

/// Make every shell script in the server bin dir executable
pub fn set_scripts_executable(ctx: &InstallContext) -> Result<()> {
    info!("- Configuring file permissions");
    let bin = ctx.path(InstallPath::ServerBin);
    if !bin.is_dir() {
        debug!("No server bin directory at {}", bin.display());
        return Ok(());
    }
    for script in fs::files_with_extensions(&bin, &["sh"])? {
        fs::set_executable(&script)?;
    }
    Ok(())
}

/// Link `link` to the deployed portal content
pub fn link_context_root(ctx: &InstallContext, link: &Path) -> Result<()> {
    let target = ctx.context_root();
    fs::link(&target, link)
        .with_context(|| format!("Failed to link {} to {}", link.display(), target.display()))?;
    Ok(())
}

/// Render an embedded template and save it over `path`
pub fn render_to(resource: Resource, scope: &TemplateScope, path: &Path) -> Result<()> {
    let text = render_resource(resource, scope)?;
    patch::save_text(path, &text)?;
    debug!("Rendered {} to {}", resource.name(), path.display());
    Ok(())
}

/// Replace each line of `path` by `rewrite(line)`, saving with a backup
pub fn rewrite_lines<F>(path: &Path, rewrite: F) -> Result<usize>
where
    F: Fn(&str) -> String,
{
    let edits = patch::patch_file(path, |lines| {
        let mut recipe = PatchRecipe::new();
        for (i, line) in lines.iter().enumerate() {
            let rewritten = rewrite(line);
            if rewritten != *line {
                recipe.set_line(i, rewritten);
            }
        }
        Ok(recipe)
    })?;
    Ok(edits)
}

/// Apply a recipe to `path`, render the result with `scope` and save it
pub fn patch_and_render<F>(path: &Path, scope: &TemplateScope, build: F) -> Result<()>
where
    F: FnOnce(&[String]) -> lpi_core::Result<PatchRecipe>,
{
    let lines = patch::load(path)?;
    let recipe = build(&lines)?;
    let patched = recipe.apply(&lines)?;
    patch::save_text(path, &render(&patched.join("\n"), scope))?;
    debug!("Patched {} with {} edits", path.display(), recipe.ops().len());
    Ok(())
}

/// Launch script line setting the java home placeholder
pub fn java_home_line(path: &Path) -> &'static str {
    let is_batch = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bat"));
    if is_batch {
        "set \"JAVA_HOME={{javaHome}}\""
    } else {
        "JAVA_HOME=\"{{javaHome}}\""
    }
}

/// Connector and engine edits common to Tomcat and JBoss 5 `server.xml`
pub fn rewrite_connector(line: &str, connector: &str, node_id: &str) -> String {
    line.replace("redirectPort=", connector).replace(
        "defaultHost=\"localhost\">",
        &format!("defaultHost=\"localhost\" jvmRoute=\"{}\">", node_id),
    )
}
