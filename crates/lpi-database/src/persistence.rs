//! Connection settings in the portal's persistence configuration
//!
//! The stock `lumishibernate.cfg.xml` ships one commented-out block per
//! vendor. The active vendor's block is uncommented and its credentials are
//! replaced; the layout inside each block is fixed, so edits are relative to
//! the line carrying the vendor's comment marker.

use crate::vendor::Vendor;
use lpi_core::config::DatabaseSettings;
use lpi_core::{Error, PatchRecipe, Result};

const SQL_SERVER_MARKER: &str = "<!-- MS SQL Server";

/// Build the edits activating `vendor` in the persistence config `lines`
pub fn persistence_recipe(
    lines: &[String],
    vendor: Vendor,
    settings: &DatabaseSettings,
) -> Result<PatchRecipe> {
    let marker = vendor.comment_marker();
    let anchor = lines
        .iter()
        .rposition(|line| line.contains(marker))
        .ok_or_else(|| Error::marker_not_found(0, marker))?;

    let mut recipe = PatchRecipe::new();

    // newer configs carry a second SQL Server block; the first one stays off
    let sql_server_blocks: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(SQL_SERVER_MARKER))
        .map(|(i, _)| i)
        .collect();
    if let [first, _, ..] = sql_server_blocks.as_slice() {
        recipe.set_line(first + 1, "\t\t<!--");
        recipe.set_line(first + 7, "\t\t-->");
    }

    recipe
        .set_line(anchor + 1, "\t\t<!-- -->")
        .set_line(
            anchor + 4,
            format!(
                "\t\t<property name=\"connection.username\">{}</property>",
                settings.user
            ),
        )
        .set_line(
            anchor + 5,
            format!(
                "\t\t<property name=\"connection.password\">{}</property>",
                settings.password
            ),
        )
        .set_line(
            anchor + 6,
            format!(
                "\t\t<property name=\"connection.url\">{}</property>",
                settings.url.replace('&', "&amp;")
            ),
        );

    // closing the block comment wins over any edit on the same line
    if let Some(end) = lines
        .iter()
        .enumerate()
        .skip(anchor + 1)
        .find(|(_, line)| line.contains("-->"))
        .map(|(i, _)| i)
    {
        recipe.set_line(end, "");
    }

    Ok(recipe)
}
