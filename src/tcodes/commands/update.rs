use crate::commands::{ensure_custom, find_custom, CmdMessage, CmdResult};
use crate::error::{EntryError, Result};
use crate::model::EntryUpdate;
use crate::reference::ReferenceCatalog;
use crate::store::EntryStore;

/// Rewrites title, description and optionally tags. The code never changes.
pub fn run<S: EntryStore>(
    store: &mut S,
    reference: &ReferenceCatalog,
    code: &str,
    update: EntryUpdate,
) -> Result<CmdResult> {
    let code = code.trim();
    ensure_custom(reference, code)?;
    let update = update.normalized()?;

    store.update_entry(code, &update)?;

    let entry = find_custom(store, code)?
        .ok_or_else(|| EntryError::NotFound(code.to_string()))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Transaction {} updated", code)));
    Ok(result.with_affected_entries(vec![entry]))
}
