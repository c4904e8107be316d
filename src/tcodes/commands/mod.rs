use crate::error::{EntryError, Result};
use crate::model::CatalogEntry;
use crate::query::TagCounts;
use crate::reference::ReferenceCatalog;
use crate::settings::{LaunchText, Settings};
use crate::snapshot::Snapshot;
use crate::store::EntryStore;
use std::path::PathBuf;

pub mod add;
pub mod config;
pub mod delete;
pub mod doctor;
pub mod export;
pub mod favorite;
pub mod import;
pub mod launch;
pub mod list;
pub mod reset;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_entries: Vec<CatalogEntry>,
    pub listed_entries: Vec<CatalogEntry>,
    pub tag_counts: Option<TagCounts>,
    pub settings: Option<Settings>,
    pub snapshot: Option<Snapshot>,
    pub launch: Option<LaunchText>,
    pub written_path: Option<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.affected_entries = entries;
        self
    }

    pub fn with_listed_entries(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_tag_counts(mut self, counts: TagCounts) -> Self {
        self.tag_counts = Some(counts);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_launch(mut self, launch: LaunchText) -> Self {
        self.launch = Some(launch);
        self
    }

    pub fn with_written_path(mut self, path: PathBuf) -> Self {
        self.written_path = Some(path);
        self
    }
}

/// Fails for codes owned by the reference catalog.
pub(crate) fn ensure_custom(reference: &ReferenceCatalog, code: &str) -> Result<()> {
    if reference.contains(code) {
        return Err(EntryError::ReferenceEntry(code.to_string()).into());
    }
    Ok(())
}

pub(crate) fn find_custom<S: EntryStore>(store: &S, code: &str) -> Result<Option<CatalogEntry>> {
    Ok(store.list_entries()?.into_iter().find(|e| e.code == code))
}

/// True when the code exists in either the reference catalog or the store.
pub(crate) fn code_exists<S: EntryStore>(
    store: &S,
    reference: &ReferenceCatalog,
    code: &str,
) -> Result<bool> {
    Ok(reference.contains(code) || find_custom(store, code)?.is_some())
}
