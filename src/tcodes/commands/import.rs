use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::reference::ReferenceCatalog;
use crate::settings::SettingsStore;
use crate::snapshot::{self, ImportPlan};
use crate::store::OverlayStore;
use serde_json::Value;
use tracing::{info, warn};

/// Validates the whole document, then applies it. A rejected document
/// leaves entries, favorites and settings exactly as they were.
pub fn run<S: OverlayStore>(
    store: &mut S,
    settings: &mut SettingsStore,
    reference: &ReferenceCatalog,
    document: &Value,
) -> Result<CmdResult> {
    let plan = snapshot::validate(document, reference)?;
    apply(store, settings, plan)
}

pub fn run_str<S: OverlayStore>(
    store: &mut S,
    settings: &mut SettingsStore,
    reference: &ReferenceCatalog,
    json: &str,
) -> Result<CmdResult> {
    let plan = snapshot::validate_str(json, reference)?;
    apply(store, settings, plan)
}

/// Settings are written first so a failed settings save leaves the overlay
/// untouched. A failed overlay write then puts the previous settings back.
fn apply<S: OverlayStore>(
    store: &mut S,
    settings: &mut SettingsStore,
    plan: ImportPlan,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if plan.is_empty() {
        result.add_message(CmdMessage::info("Nothing to import."));
        return Ok(result);
    }

    let previous = settings.settings().clone();
    let imports_settings = plan.settings.is_some();
    if let Some(new_settings) = plan.settings {
        settings.replace(new_settings)?;
    }

    if plan.entries.is_some() || plan.favorites.is_some() {
        if let Err(e) = store.replace_overlay(plan.entries.as_deref(), plan.favorites.as_ref()) {
            if imports_settings {
                if let Err(restore) = settings.replace(previous) {
                    warn!(error = %restore, "could not restore settings after failed import");
                }
            }
            return Err(e);
        }
    }

    if let Some(entries) = &plan.entries {
        result.add_message(CmdMessage::success(format!(
            "Imported {} custom transaction(s)",
            entries.len()
        )));
    }
    if let Some(favorites) = &plan.favorites {
        result.add_message(CmdMessage::success(format!(
            "Imported {} favorite(s)",
            favorites.len()
        )));
    }
    if imports_settings {
        result.add_message(CmdMessage::success("Imported settings"));
        result = result.with_settings(settings.settings().clone());
    }

    info!(
        entries = plan.entries.as_ref().map(|e| e.len()),
        favorites = plan.favorites.as_ref().map(|f| f.len()),
        "imported snapshot"
    );
    Ok(result)
}
