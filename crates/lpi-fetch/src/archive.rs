//! ZIP extraction and packaging

use anyhow::{anyhow, Context, Result};
use lpi_core::ProgressMeter;
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Extract `archive` into `target`
///
/// Every entry counts toward the returned total, including directories and
/// entries skipped because their full name matches `ignore`. With
/// `strip_root` the first `/`-delimited segment of each name is dropped.
pub fn extract(
    archive: &Path,
    target: &Path,
    ignore: Option<&str>,
    strip_root: bool,
) -> Result<usize> {
    let file_name = archive
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("- Extracting {}", file_name);

    let ignore = ignore
        .map(|pattern| Regex::new(&format!("^(?:{})$", pattern)))
        .transpose()
        .context("Invalid ignore pattern")?;

    let file = File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive {}", archive.display()))?;

    let mut progress = ProgressMeter::new();
    let mut total = 0;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .with_context(|| format!("Failed to read entry {} of {}", i, file_name))?;
        total += 1;

        let name = entry.name().to_string();
        if ignore.as_ref().is_some_and(|re| re.is_match(&name)) {
            continue;
        }

        let relative = if strip_root {
            name.split_once('/').map(|(_, rest)| rest).unwrap_or(&name)
        } else {
            name.as_str()
        };
        let Some(relative) = safe_relative(relative) else {
            warn!("Skipping entry outside the target directory: {}", name);
            continue;
        };
        let path = target.join(relative);

        if name.ends_with('/') {
            fs::create_dir_all(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let mut out =
                File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
            io::copy(&mut entry, &mut out).with_context(|| format!("Failed to write {}", path.display()))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode().filter(|mode| mode & 0o777 != 0) {
                    fs::set_permissions(&path, fs::Permissions::from_mode(mode & 0o777))?;
                }
            }
        }

        progress.tick_with(|| format!("  |- {} files extracted", total));
    }

    info!("  +- Finished extraction of {} files", total);
    Ok(total)
}

/// Reject names that would escape the target directory
fn safe_relative(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| path.to_path_buf())
}

/// Pack every file under `source` into the archive at `destination`
///
/// Entry names are relative to `source` with `/` separators. Returns the
/// number of files written.
pub fn package(source: &Path, destination: &Path) -> Result<usize> {
    info!("- Creating {}", destination.display());
    if !source.is_dir() {
        return Err(anyhow!("{} is not a directory", source.display()));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    let mut count = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(source)?;
        let name = lpi_core::fs::to_slash(relative);

        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        let data = fs::read(entry.path())?;
        zip.write_all(&data)?;
        count += 1;
    }

    zip.finish().context("Failed to finish archive")?;
    info!("  +- Finished packaging of {} files", count);
    Ok(count)
}
