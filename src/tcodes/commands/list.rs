use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::CatalogEntry;
use crate::query::{tag_counts, Query};
use crate::settings::Settings;

/// Lists the merged catalog through a query, favorites first.
pub fn run(merged: &[CatalogEntry], query: &Query, settings: &Settings) -> Result<CmdResult> {
    let listed = query.apply(merged, &settings.visible_groups, settings.sort_order);
    Ok(CmdResult::default().with_listed_entries(listed))
}

/// Per-tag counts for the current search text.
pub fn counts(merged: &[CatalogEntry], search: &str, settings: &Settings) -> Result<CmdResult> {
    let counts = tag_counts(merged, search, &settings.visible_groups);
    Ok(CmdResult::default().with_tag_counts(counts))
}
