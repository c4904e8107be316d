use crate::commands::{ensure_custom, CmdMessage, CmdResult};
use crate::error::Result;
use crate::reference::ReferenceCatalog;
use crate::store::EntryStore;

/// Deleting an absent code succeeds with an info message.
pub fn run<S: EntryStore>(
    store: &mut S,
    reference: &ReferenceCatalog,
    code: &str,
) -> Result<CmdResult> {
    let code = code.trim();
    ensure_custom(reference, code)?;

    let mut result = CmdResult::default();
    if store.delete_entry(code)? {
        result.add_message(CmdMessage::success(format!("Transaction {} deleted", code)));
    } else {
        result.add_message(CmdMessage::info(format!(
            "Transaction {} does not exist, nothing to delete",
            code
        )));
    }
    Ok(result)
}
