use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::SettingsStore;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(settings: &mut SettingsStore, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default().with_settings(settings.settings().clone())),
        ConfigAction::ShowKey(key) => {
            let mut result = CmdResult::default();
            match settings.settings().get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => result.add_message(CmdMessage::error(format!("Unknown setting: {}", key))),
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut next = settings.settings().clone();
            if let Err(e) = next.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e));
                return Ok(res);
            }
            settings.replace(next)?;
            let display_val = settings.settings().get(&key).unwrap_or(value);
            let mut result = CmdResult::default().with_settings(settings.settings().clone());
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}
