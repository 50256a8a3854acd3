//! Reconstruction of executable statements from raw SQL scripts
//!
//! Two terminators are honoured at once: a line starting with the batch
//! separator `GO` closes the pending statement, and so does any line that
//! leaves the pending statement ending in `;`. Scripts may mix both styles.

use std::path::Path;
use tracing::debug;

/// Batch separator token
pub const BATCH_SEPARATOR: &str = "GO";

const COMMENT_PREFIXES: &[&str] = &["PRINT", "--", "#"];

/// Convert raw script lines into statements
///
/// Text left pending after the last terminator is dropped.
pub fn convert<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut statements = Vec::new();
    let mut buffer = String::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || COMMENT_PREFIXES.iter().any(|p| line.starts_with(p)) {
            continue;
        }

        let complete = if line.starts_with(BATCH_SEPARATOR) {
            !buffer.trim().is_empty()
        } else {
            buffer.push_str(&line.replace('\t', ""));
            buffer.push(' ');
            buffer.trim().ends_with(';')
        };

        if complete {
            statements.push(buffer.trim().to_string());
            buffer.clear();
        }
    }

    if !buffer.trim().is_empty() {
        debug!("Dropping unterminated statement: {}", buffer.trim());
    }

    statements
}

/// Read `path` and convert its lines
pub fn convert_file(path: &Path) -> lpi_core::Result<Vec<String>> {
    let lines = lpi_core::patch::load(path)?;
    Ok(convert(&lines))
}
