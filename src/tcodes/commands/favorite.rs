use crate::commands::{code_exists, CmdMessage, CmdResult};
use crate::error::{EntryError, Result};
use crate::reference::ReferenceCatalog;
use crate::store::{EntryStore, FavoriteStore};
use tracing::debug;

/// Marks or unmarks a code. Both directions are idempotent.
///
/// Only codes that exist can be favorited; unfavoriting is always allowed
/// so stale favorites can be cleared by hand.
pub fn set<S: EntryStore + FavoriteStore>(
    store: &mut S,
    reference: &ReferenceCatalog,
    code: &str,
    favorite: bool,
) -> Result<CmdResult> {
    let code = code.trim();
    let mut result = CmdResult::default();

    if favorite {
        if !code_exists(store, reference, code)? {
            return Err(EntryError::NotFound(code.to_string()).into());
        }
        store.add_favorite(code)?;
        result.add_message(CmdMessage::success(format!("{} added to favorites", code)));
    } else {
        store.remove_favorite(code)?;
        result.add_message(CmdMessage::success(format!(
            "{} removed from favorites",
            code
        )));
    }
    debug!(code, favorite, "favorite changed");
    Ok(result)
}

/// Flips the favorite flag and reports the new state in the first message.
pub fn toggle<S: EntryStore + FavoriteStore>(
    store: &mut S,
    reference: &ReferenceCatalog,
    code: &str,
) -> Result<CmdResult> {
    let currently = store.list_favorites()?.contains(code.trim());
    set(store, reference, code, !currently)
}
