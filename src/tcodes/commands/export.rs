use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::Settings;
use crate::snapshot::Snapshot;
use crate::store::{EntryStore, FavoriteStore};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Captures the current overlay and settings.
pub fn snapshot<S: EntryStore + FavoriteStore>(store: &S, settings: &Settings) -> Result<Snapshot> {
    Ok(Snapshot::capture(
        settings,
        store.list_entries()?,
        &store.list_favorites()?,
    ))
}

pub fn default_filename() -> String {
    format!("tcodes-{}.json", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes the snapshot as pretty JSON. Without a target, a timestamped file
/// is created in `dir`.
pub fn run<S: EntryStore + FavoriteStore>(
    store: &S,
    settings: &Settings,
    target: Option<&Path>,
    dir: &Path,
) -> Result<CmdResult> {
    let snapshot = snapshot(store, settings)?;
    let path: PathBuf = match target {
        Some(path) => path.to_path_buf(),
        None => dir.join(default_filename()),
    };

    fs::write(&path, snapshot.to_json_pretty()?)?;
    info!(
        path = %path.display(),
        entries = snapshot.custom_transactions.len(),
        favorites = snapshot.favorite_transactions.len(),
        "exported snapshot"
    );

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} custom transaction(s) and {} favorite(s) to {}",
        snapshot.custom_transactions.len(),
        snapshot.favorite_transactions.len(),
        path.display()
    )));
    Ok(result.with_snapshot(snapshot).with_written_path(path))
}
