use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::OverlayStore;
use std::collections::BTreeSet;
use tracing::info;

/// Drops every custom entry and favorite in one write. Settings survive.
pub fn run<S: OverlayStore>(store: &mut S) -> Result<CmdResult> {
    let removed_entries = store.list_entries()?.len();
    let removed_favorites = store.list_favorites()?.len();

    store.replace_overlay(Some(&[]), Some(&BTreeSet::new()))?;
    info!(removed_entries, removed_favorites, "reset to factory defaults");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Reset to factory defaults: removed {} custom transaction(s) and {} favorite(s)",
        removed_entries, removed_favorites
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::{EntryStore, FavoriteStore};

    #[test]
    fn clears_entries_and_favorites() {
        let mut store = StoreFixture::new()
            .with_entries(3)
            .with_favorite("SE11")
            .with_favorite("Z002")
            .store;
        let result = run(&mut store).unwrap();

        assert!(store.list_entries().unwrap().is_empty());
        assert!(store.list_favorites().unwrap().is_empty());
        assert!(result.messages[0].content.contains("3 custom"));
    }
}
