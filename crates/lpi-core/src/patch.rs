//! Line-oriented text patching
//!
//! Vendor config files are loaded as a list of lines, edited by a
//! [`PatchRecipe`] of index-relative operations and written back with the
//! previous file kept as a `.original` sibling.
//!
//! A recipe is built by scanning the loaded lines for markers and anchoring
//! edits on the matching indices. Every operation addresses the snapshot the
//! recipe was built from, so an insertion never shifts the index of a later
//! edit.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the backup written by [`save`]
pub const BACKUP_SUFFIX: &str = ".original";

/// Read a text file into its lines
pub fn load(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Write lines joined by `\n`, backing up an existing file first
pub fn save(path: &Path, lines: &[String]) -> Result<()> {
    save_text(path, &lines.join("\n"))
}

/// Write text, backing up an existing file first
///
/// An existing `path` is renamed to `path.original`, replacing any earlier
/// backup. Otherwise the missing parent directories are created.
pub fn save_text(path: &Path, text: &str) -> Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        if cfg!(windows) && backup.exists() {
            fs::remove_file(&backup).map_err(|e| Error::io(&backup, e))?;
        }
        fs::rename(path, &backup).map_err(|e| Error::io(path, e))?;
        debug!("Backed up {} to {}", path.display(), backup.display());
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    fs::write(path, text).map_err(|e| Error::io(path, e))
}

/// `path` with `.original` appended to its file name
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Remove lines from `start` through the first one containing `marker`
///
/// At least one line is removed; an empty marker removes exactly the line at
/// `start`. Returns the number of removed lines. When no line at or after
/// `start` contains the marker the list is left untouched and
/// [`Error::MarkerNotFound`] is returned.
pub fn remove_until_match(lines: &mut Vec<String>, start: usize, marker: &str) -> Result<usize> {
    let end = find_marker(lines, start, marker)?;
    lines.drain(start..=end);
    Ok(end - start + 1)
}

fn find_marker(lines: &[String], start: usize, marker: &str) -> Result<usize> {
    lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, line)| line.contains(marker))
        .map(|(i, _)| i)
        .ok_or_else(|| Error::marker_not_found(start, marker))
}

/// One edit of a patch recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Replace the line at `index`
    SetLine { index: usize, text: String },
    /// Insert `lines` before the line at `index` (`index == len` appends)
    InsertLines { index: usize, lines: Vec<String> },
    /// Remove from `start` through the first line containing `marker`
    RemoveUntilMatch { start: usize, marker: String },
}

/// Ordered list of edits over one loaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchRecipe {
    ops: Vec<PatchOp>,
}

impl PatchRecipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: PatchOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn set_line(&mut self, index: usize, text: impl Into<String>) -> &mut Self {
        self.push(PatchOp::SetLine {
            index,
            text: text.into(),
        })
    }

    pub fn insert_lines(&mut self, index: usize, lines: Vec<String>) -> &mut Self {
        self.push(PatchOp::InsertLines { index, lines })
    }

    pub fn remove_until_match(&mut self, start: usize, marker: impl Into<String>) -> &mut Self {
        self.push(PatchOp::RemoveUntilMatch {
            start,
            marker: marker.into(),
        })
    }

    /// Remove the single line at `index`
    pub fn remove_line(&mut self, index: usize) -> &mut Self {
        self.remove_until_match(index, "")
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply the recipe to the snapshot it was built from
    ///
    /// Replacements are last-wins per index. Insertions sharing an anchor are
    /// emitted in recipe order ahead of the anchor line, and stay in place
    /// even when the anchor line itself is removed. Removal ranges are
    /// resolved against the snapshot and take precedence over replacements.
    pub fn apply(&self, lines: &[String]) -> Result<Vec<String>> {
        let len = lines.len();
        let mut replaced: BTreeMap<usize, &str> = BTreeMap::new();
        let mut inserted: BTreeMap<usize, Vec<&String>> = BTreeMap::new();
        let mut removed = vec![false; len];

        for op in &self.ops {
            match op {
                PatchOp::SetLine { index, text } => {
                    if *index >= len {
                        return Err(Error::IndexOutOfRange { index: *index, len });
                    }
                    replaced.insert(*index, text);
                }
                PatchOp::InsertLines { index, lines } => {
                    if *index > len {
                        return Err(Error::IndexOutOfRange { index: *index, len });
                    }
                    inserted.entry(*index).or_default().extend(lines.iter());
                }
                PatchOp::RemoveUntilMatch { start, marker } => {
                    let end = find_marker(lines, *start, marker)?;
                    removed[*start..=end].fill(true);
                }
            }
        }

        let mut result = Vec::with_capacity(len);
        for (i, line) in lines.iter().enumerate() {
            if let Some(block) = inserted.get(&i) {
                result.extend(block.iter().map(|l| l.to_string()));
            }
            if removed[i] {
                continue;
            }
            match replaced.get(&i) {
                Some(text) => result.push(text.to_string()),
                None => result.push(line.clone()),
            }
        }
        if let Some(block) = inserted.get(&len) {
            result.extend(block.iter().map(|l| l.to_string()));
        }

        Ok(result)
    }
}

/// Load `path`, build a recipe from its lines, apply it and save the result
///
/// Returns the number of edits applied.
pub fn patch_file<F>(path: &Path, build: F) -> Result<usize>
where
    F: FnOnce(&[String]) -> Result<PatchRecipe>,
{
    let lines = load(path)?;
    let recipe = build(&lines)?;
    let patched = recipe.apply(&lines)?;
    save(path, &patched)?;
    debug!("Patched {} with {} edits", path.display(), recipe.ops().len());
    Ok(recipe.ops().len())
}
