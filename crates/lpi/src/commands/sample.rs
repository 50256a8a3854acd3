//! Write a sample configuration file

use crate::cli::SampleArgs;
use crate::output;
use anyhow::{bail, Context, Result};
use lpi_core::config::KNOWN_SERVER_INSTALL_FILES;
use lpi_core::templates::render_resource;
use lpi_core::{Resource, TemplateScope, VERSION};

/// Exit status after writing the sample; the install does not run
pub const SAMPLE_EXIT_CODE: i32 = 1;

pub fn run(args: SampleArgs) -> Result<i32> {
    if args.output.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            args.output.display()
        );
    }

    let content = sample_config()?;
    std::fs::write(&args.output, content)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    output::success(&format!(
        "Sample configuration written to {}",
        args.output.display()
    ));
    output::info("Edit it and run `lpi install`");
    Ok(SAMPLE_EXIT_CODE)
}

/// Sample configuration text listing the known server install files
pub fn sample_config() -> Result<String> {
    let known_servers = KNOWN_SERVER_INSTALL_FILES
        .iter()
        .map(|(key, file)| format!("  #   {}: {}", key, file))
        .collect::<Vec<_>>()
        .join("\n");

    let scope = TemplateScope::new()
        .with("version", VERSION)
        .with("knownServers", known_servers);
    Ok(render_resource(Resource::SampleConfig, &scope)?)
}
