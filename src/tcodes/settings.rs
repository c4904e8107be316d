use crate::error::{CatalogError, Result};
use crate::query::SortOrder;
use crate::tags::{known_tags, normalize_tags};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const SETTINGS_FILENAME: &str = "settings.json";

const WEBGUI_PATH: &str = "/sap/bc/gui/sap/its/webgui?~transaction=";

/// What happens when a code is picked from the list.
///
/// Serialized with the labels the settings dialog always used, so exported
/// files stay readable by both generations of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CopyOption {
    #[serde(rename = "Just copy T-Code")]
    JustCopy,
    #[serde(rename = "Copy T-Code with /n prefix")]
    NPrefix,
    #[serde(rename = "Copy T-Code with /o prefix")]
    OPrefix,
    #[default]
    #[serde(rename = "Copy T-Code with /n prefix by default and with /o if shift key is pressed")]
    Default,
    #[serde(rename = "Open in WebGUI")]
    WebGui,
}

impl CopyOption {
    pub const ALL: [CopyOption; 5] = [
        CopyOption::JustCopy,
        CopyOption::NPrefix,
        CopyOption::OPrefix,
        CopyOption::Default,
        CopyOption::WebGui,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CopyOption::JustCopy => "just-copy",
            CopyOption::NPrefix => "n-prefix",
            CopyOption::OPrefix => "o-prefix",
            CopyOption::Default => "default",
            CopyOption::WebGui => "webgui",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CopyOption::JustCopy => "Just copy T-Code",
            CopyOption::NPrefix => "Copy T-Code with /n prefix",
            CopyOption::OPrefix => "Copy T-Code with /o prefix",
            CopyOption::Default => {
                "Copy T-Code with /n prefix by default and with /o if shift key is pressed"
            }
            CopyOption::WebGui => "Open in WebGUI",
        }
    }
}

impl FromStr for CopyOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        CopyOption::ALL
            .into_iter()
            .find(|o| o.key().eq_ignore_ascii_case(wanted) || o.label() == wanted)
            .ok_or_else(|| {
                let keys: Vec<_> = CopyOption::ALL.iter().map(|o| o.key()).collect();
                format!(
                    "Unknown copy option '{}' (expected one of: {})",
                    wanted,
                    keys.join(", ")
                )
            })
    }
}

impl fmt::Display for CopyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!(
                "Unknown theme '{}' (expected Light, Dark or System)",
                other
            )),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        };
        write!(f, "{}", name)
    }
}

/// The text to hand to the clipboard, or a URL to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchText {
    Text(String),
    Url(String),
}

impl LaunchText {
    pub fn as_str(&self) -> &str {
        match self {
            LaunchText::Text(s) | LaunchText::Url(s) => s,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, LaunchText::Url(_))
    }
}

impl fmt::Display for LaunchText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User preferences, stored in settings.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub copy_option: CopyOption,

    /// Base URL of the SAP system used by the WebGUI copy option
    #[serde(default)]
    pub sap_system_url: String,

    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub reset_search_after_copy: bool,

    #[serde(default)]
    pub theme: Theme,

    /// Tags included in the ALL view
    #[serde(default = "known_tags")]
    pub visible_groups: BTreeSet<String>,

    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_true() -> bool {
    true
}

/// Older exports wrote booleans as the strings "true"/"false".
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => Ok(s.trim() != "false"),
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("Expected true or false, got '{}'", other)),
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            copy_option: CopyOption::default(),
            sap_system_url: String::new(),
            reset_search_after_copy: true,
            theme: Theme::default(),
            visible_groups: known_tags(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Keys accepted by [`Settings::get`] and [`Settings::set`].
pub const SETTING_KEYS: [&str; 6] = [
    "copyOption",
    "sapSystemUrl",
    "resetSearchAfterCopy",
    "theme",
    "visibleGroups",
    "sortOrder",
];

/// Maps `copy-option`, `copy_option` and `copyOption` to the same key.
fn canonical_key(key: &str) -> Option<&'static str> {
    let folded: String = key
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    SETTING_KEYS
        .into_iter()
        .find(|k| k.to_ascii_lowercase() == folded)
}

impl Settings {
    pub fn launch_text(&self, code: &str, alternate: bool) -> LaunchText {
        match self.copy_option {
            CopyOption::JustCopy => LaunchText::Text(code.to_string()),
            CopyOption::NPrefix => LaunchText::Text(format!("/n{}", code)),
            CopyOption::OPrefix => LaunchText::Text(format!("/o{}", code)),
            CopyOption::Default if alternate => LaunchText::Text(format!("/o{}", code)),
            CopyOption::Default => LaunchText::Text(format!("/n{}", code)),
            CopyOption::WebGui => {
                let base = self.sap_system_url.trim().trim_end_matches('/');
                if base.is_empty() {
                    LaunchText::Text(format!("/n{}", code))
                } else {
                    LaunchText::Url(format!("{}{}{}", base, WEBGUI_PATH, code))
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match canonical_key(key)? {
            "copyOption" => self.copy_option.to_string(),
            "sapSystemUrl" => self.sap_system_url.clone(),
            "resetSearchAfterCopy" => self.reset_search_after_copy.to_string(),
            "theme" => self.theme.to_string(),
            "visibleGroups" => self
                .visible_groups
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(","),
            "sortOrder" => self.sort_order.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a key from its string form. Lists are comma separated.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match canonical_key(key) {
            Some("copyOption") => self.copy_option = value.parse()?,
            Some("sapSystemUrl") => self.sap_system_url = value.trim().to_string(),
            Some("resetSearchAfterCopy") => self.reset_search_after_copy = parse_bool(value)?,
            Some("theme") => self.theme = value.parse()?,
            Some("visibleGroups") => {
                self.visible_groups = normalize_tags(
                    value.split(',').map(str::trim).filter(|t| !t.is_empty()),
                )
                .map_err(|e| e.to_string())?
            }
            Some("sortOrder") => self.sort_order = value.parse()?,
            _ => return Err(format!("Unknown setting: {}", key)),
        }
        Ok(())
    }
}

/// Owns the settings document and writes it back after every change.
///
/// Without a path the store is memory only, which is what tests use.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: Settings,
}

impl SettingsStore {
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            settings,
        }
    }

    /// Load settings from the given file, or defaults if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Settings::default()
        };
        debug!(path = %path.display(), "loaded settings");
        Ok(Self {
            path: Some(path),
            settings,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Replaces the whole document, as an import does.
    pub fn replace(&mut self, settings: Settings) -> Result<()> {
        self.update(|s| *s = settings)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.settings.clone();
        next.set(key, value).map_err(CatalogError::Api)?;
        self.replace(next)
    }

    pub fn set_copy_option(&mut self, option: CopyOption) -> Result<()> {
        self.update(|s| s.copy_option = option)
    }

    pub fn set_sap_system_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.update(|s| s.sap_system_url = url)
    }

    pub fn set_reset_search_after_copy(&mut self, reset: bool) -> Result<()> {
        self.update(|s| s.reset_search_after_copy = reset)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.update(|s| s.theme = theme)
    }

    pub fn set_visible_groups<I, T>(&mut self, groups: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let groups = normalize_tags(groups)?;
        self.update(|s| s.visible_groups = groups)
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<()> {
        self.update(|s| s.sort_order = order)
    }

    /// Applies the change and persists. On a failed write the in-memory
    /// document is rolled back.
    fn update<F: FnOnce(&mut Settings)>(&mut self, change: F) -> Result<()> {
        let previous = self.settings.clone();
        change(&mut self.settings);
        if let Err(e) = self.save() {
            self.settings = previous;
            return Err(e);
        }
        debug!("settings saved");
        Ok(())
    }
}
