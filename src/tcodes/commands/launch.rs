use crate::commands::{CmdMessage, CmdResult};
use crate::error::{EntryError, Result};
use crate::model::CatalogEntry;
use crate::settings::Settings;

/// Resolves what picking `code` produces under the current copy option.
/// `alternate` is the shift-key variant.
pub fn run(
    merged: &[CatalogEntry],
    settings: &Settings,
    code: &str,
    alternate: bool,
) -> Result<CmdResult> {
    let code = code.trim();
    if !merged.iter().any(|e| e.code == code) {
        return Err(EntryError::NotFound(code.to_string()).into());
    }

    let launch = settings.launch_text(code, alternate);
    let mut result = CmdResult::default();
    if launch.is_url() {
        result.add_message(CmdMessage::info(format!("Open {}", launch)));
    } else {
        result.add_message(CmdMessage::info(launch.to_string()));
    }
    Ok(result.with_launch(launch))
}
