use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::merge::{dangling_favorites, merge};
use crate::reference::ReferenceCatalog;
use crate::store::OverlayStore;
use std::collections::BTreeSet;
use tracing::warn;

/// Removes favorites whose code exists in neither the reference catalog nor
/// the custom entries.
pub fn run<S: OverlayStore>(store: &mut S, reference: &ReferenceCatalog) -> Result<CmdResult> {
    let favorites = store.list_favorites()?;
    let merged = merge(reference.entries(), store.list_entries()?, &favorites);
    let dangling = dangling_favorites(&merged, &favorites);
    let kept: BTreeSet<String> = favorites.difference(&dangling).cloned().collect();

    let mut result = CmdResult::default();
    if dangling.is_empty() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    store.replace_overlay(None, Some(&kept))?;
    warn!(count = dangling.len(), "pruned dangling favorites");

    result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
    result.add_message(CmdMessage::info(format!(
        "  - Removed {} favorite(s) pointing at unknown codes: {}",
        dangling.len(),
        dangling.into_iter().collect::<Vec<_>>().join(", ")
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::{EntryStore, FavoriteStore};

    #[test]
    fn prunes_only_dangling_favorites() {
        let reference = ReferenceCatalog::from_json_str(r#"[{"code": "SE11"}]"#).unwrap();
        let mut store = StoreFixture::new()
            .with_entries(1)
            .with_favorite("SE11")
            .with_favorite("Z001")
            .with_favorite("GONE")
            .store;

        let result = run(&mut store, &reference).unwrap();

        let favorites = store.list_favorites().unwrap();
        assert_eq!(favorites.len(), 2);
        assert!(!favorites.contains("GONE"));
        assert_eq!(store.list_entries().unwrap().len(), 1);
        assert!(result.messages[1].content.contains("GONE"));
    }

    #[test]
    fn clean_store_reports_nothing() {
        let mut store = StoreFixture::new().with_entries(1).with_favorite("Z001").store;
        let result = run(&mut store, &ReferenceCatalog::empty()).unwrap();
        assert_eq!(result.messages[0].content, "No inconsistencies found.");
    }
}
