use crate::commands::{CmdMessage, CmdResult};
use crate::error::{EntryError, Result};
use crate::model::NewEntry;
use crate::reference::ReferenceCatalog;
use crate::store::EntryStore;

pub fn run<S: EntryStore>(
    store: &mut S,
    reference: &ReferenceCatalog,
    entry: NewEntry,
) -> Result<CmdResult> {
    let entry = entry.normalized()?;
    if reference.contains(&entry.code) {
        return Err(EntryError::DuplicateCode(entry.code).into());
    }

    store.add_entry(&entry)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Transaction {} added",
        entry.code
    )));
    Ok(result.with_affected_entries(vec![entry.into_entry()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::store::memory::fixtures::StoreFixture;

    fn reference() -> ReferenceCatalog {
        ReferenceCatalog::from_json_str(r#"[{"code": "SE11", "tags": ["ABAP"]}]"#).unwrap()
    }

    #[test]
    fn adds_custom_entry() {
        let mut store = StoreFixture::new().store;
        let result = run(&mut store, &reference(), NewEntry::new(" Z001 ", "My Tool")).unwrap();

        assert_eq!(result.affected_entries[0].code, "Z001");
        assert!(result.affected_entries[0].has_tag("CUSTOM"));
        assert_eq!(store.list_entries().unwrap().len(), 1);
    }

    #[test]
    fn reference_collision_is_duplicate() {
        let mut store = StoreFixture::new().store;
        let err = run(
            &mut store,
            &reference(),
            NewEntry::new("SE11", "Anything").with_tags(["FI"]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Entry(EntryError::DuplicateCode(ref c)) if c == "SE11"
        ));
        assert!(store.list_entries().unwrap().is_empty());
    }

    #[test]
    fn custom_collision_is_duplicate() {
        let mut store = StoreFixture::new().with_entries(1).store;
        let err = run(&mut store, &reference(), NewEntry::new("Z001", "again")).unwrap_err();
        assert!(matches!(err, CatalogError::Entry(EntryError::DuplicateCode(_))));
    }

    #[test]
    fn invalid_tag_is_rejected_before_storing() {
        let mut store = StoreFixture::new().store;
        let err = run(
            &mut store,
            &reference(),
            NewEntry::new("Z9", "").with_tags(["no spaces"]),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Entry(EntryError::InvalidTag { .. })));
        assert!(store.list_entries().unwrap().is_empty());
    }
}
