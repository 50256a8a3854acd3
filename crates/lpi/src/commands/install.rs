//! Install command

use crate::cli::InstallArgs;
use crate::config::load_properties;
use crate::output;
use anyhow::{Context, Result};
use lpi_core::{InstallerSettings, PropertyMap, VERSION};
use lpi_fetch::Fetcher;
use lpi_installer::{InstallPipeline, PipelineReport, ResolutionError};
use std::path::Path;

pub async fn run(args: InstallArgs, config: Option<&Path>) -> Result<i32> {
    let mut props = load_properties(config)?;
    apply_args(&mut props, &args)?;

    let settings = InstallerSettings::from_properties(&props).context("Invalid configuration")?;
    let fetcher = Fetcher::new()?;

    let mut pipeline = match InstallPipeline::from_settings(settings, fetcher) {
        Ok(pipeline) => pipeline.strict(args.strict),
        Err(e) => {
            report_unresolved(&e);
            return Ok(ResolutionError::EXIT_CODE);
        }
    };

    output::banner(&format!("Starting Lumis Portal Installer {}", VERSION));
    for (key, value) in pipeline.context().settings.summary() {
        output::setting(key, &value);
    }

    let report = pipeline.run().await;
    finish(&report);
    Ok(report.exit_code())
}

/// Layer `--home` and `--set` on top of the file properties
fn apply_args(props: &mut PropertyMap, args: &InstallArgs) -> Result<()> {
    if let Some(home) = &args.home {
        props.set("install.home", home.display().to_string());
    }
    props.apply_overrides(&args.set)?;
    Ok(())
}

fn report_unresolved(err: &ResolutionError) {
    for unresolved in &err.unresolved {
        let mut lines = unresolved.lines().into_iter();
        if let Some(first) = lines.next() {
            output::error(&first);
        }
        for line in lines {
            eprintln!("{}", line);
        }
    }
}

fn finish(report: &PipelineReport) {
    output::banner(&format!("Finished Lumis Portal Installer {}", VERSION));
    if report.is_success() {
        output::success("All steps completed");
        return;
    }
    for failure in &report.failures {
        output::warning(&format!("{} failed: {}", failure.step, failure.message));
    }
    if report.strict {
        output::error("Install stopped at the first failed step");
    } else {
        output::warning("Install finished with failed steps");
    }
}
