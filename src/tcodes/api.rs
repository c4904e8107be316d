//! # API Facade
//!
//! [`CatalogApi`] is the single entry point for every catalog operation,
//! whatever the UI. It dispatches to `commands/*.rs` and owns the catalog
//! lifecycle:
//!
//! ```text
//! Uninitialized ──open()──▶ Loading ──▶ Ready ◀──▶ Refreshing
//! ```
//!
//! - Queries are served from the last merged view. They fail with
//!   `CatalogError::NotReady` until `open()` succeeds.
//! - Every write runs against the store, then the view is re-merged from
//!   the store. A failed write, or a failed re-merge, leaves the previous
//!   view in place and the state back at `Ready`.
//! - Settings changes do not touch the merged view; queries read settings
//!   at call time.
//!
//! ## What the API Does NOT Do
//!
//! No business logic (commands), no storage details (store), no output
//! formatting (CLI). Methods return data, never strings for a terminal.
//!
//! ## Generic Over OverlayStore
//!
//! - Production: `CatalogApi<SqliteStore>`
//! - Testing: `CatalogApi<InMemoryStore>`

use crate::commands::{self, config::ConfigAction, CmdResult};
use crate::error::{CatalogError, Result};
use crate::merge::merge;
use crate::model::{CatalogEntry, EntryUpdate, NewEntry};
use crate::query::{self, Query, TagCounts, TagFilter};
use crate::reference::ReferenceCatalog;
use crate::settings::{LaunchText, Settings, SettingsStore};
use crate::snapshot::Snapshot;
use crate::store::OverlayStore;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Loading,
    Ready,
    Refreshing,
}

impl fmt::Display for CatalogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogState::Uninitialized => "uninitialized",
            CatalogState::Loading => "loading",
            CatalogState::Ready => "ready",
            CatalogState::Refreshing => "refreshing",
        };
        write!(f, "{}", name)
    }
}

pub struct CatalogApi<S: OverlayStore> {
    reference: ReferenceCatalog,
    store: S,
    settings: SettingsStore,
    merged: Vec<CatalogEntry>,
    state: CatalogState,
}

impl<S: OverlayStore> CatalogApi<S> {
    pub fn new(reference: ReferenceCatalog, store: S, settings: SettingsStore) -> Self {
        Self {
            reference,
            store,
            settings,
            merged: Vec::new(),
            state: CatalogState::Uninitialized,
        }
    }

    /// Opens the store (running migrations) and builds the first view.
    pub fn open(&mut self) -> Result<()> {
        if self.state != CatalogState::Uninitialized {
            return Ok(());
        }
        self.state = CatalogState::Loading;
        let opened = self.store.open().and_then(|_| self.remerge());
        match opened {
            Ok(merged) => {
                self.merged = merged;
                self.state = CatalogState::Ready;
                debug!(entries = self.merged.len(), "catalog ready");
                Ok(())
            }
            Err(e) => {
                self.state = CatalogState::Uninitialized;
                Err(e)
            }
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn reference(&self) -> &ReferenceCatalog {
        &self.reference
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            CatalogState::Ready | CatalogState::Refreshing => Ok(()),
            other => Err(CatalogError::NotReady(other.to_string())),
        }
    }

    fn remerge(&self) -> Result<Vec<CatalogEntry>> {
        Ok(merge(
            self.reference.entries(),
            self.store.list_entries()?,
            &self.store.list_favorites()?,
        ))
    }

    /// Runs a store write, then swaps in a fresh merge. The view is rebuilt
    /// from the store even when the write fails; it only stays stale when the
    /// store cannot be read back.
    fn write<F>(&mut self, op: F) -> Result<CmdResult>
    where
        F: FnOnce(&mut S, &ReferenceCatalog, &mut SettingsStore) -> Result<CmdResult>,
    {
        self.ensure_ready()?;
        self.state = CatalogState::Refreshing;
        let outcome = op(&mut self.store, &self.reference, &mut self.settings);
        let merged = self.remerge();
        self.state = CatalogState::Ready;

        match (outcome, merged) {
            (Ok(result), Ok(merged)) => {
                self.merged = merged;
                Ok(result)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), merged) => {
                match merged {
                    Ok(merged) => self.merged = merged,
                    Err(read_err) => debug!(error = %read_err, "keeping previous view"),
                }
                Err(e)
            }
        }
    }

    // --- Queries ---

    /// Reference entries in dataset order, then custom entries by code.
    pub fn merged_catalog(&self) -> Result<&[CatalogEntry]> {
        self.ensure_ready()?;
        Ok(&self.merged)
    }

    pub fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        Ok(query::search(self.merged_catalog()?, query))
    }

    pub fn filter_by_tag(&self, filter: &TagFilter) -> Result<Vec<CatalogEntry>> {
        Ok(query::filter_by_tag(
            self.merged_catalog()?,
            filter,
            &self.settings.settings().visible_groups,
        ))
    }

    pub fn sorted_view(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = self.merged_catalog()?.to_vec();
        query::sort(&mut entries, self.settings.settings().sort_order);
        Ok(entries)
    }

    pub fn list(&self, query: &Query) -> Result<CmdResult> {
        commands::list::run(self.merged_catalog()?, query, self.settings.settings())
    }

    pub fn tag_counts(&self, search: &str) -> Result<TagCounts> {
        let result = commands::list::counts(self.merged_catalog()?, search, self.settings.settings())?;
        Ok(result.tag_counts.unwrap_or_default())
    }

    pub fn is_favorite(&self, code: &str) -> Result<bool> {
        Ok(self
            .merged_catalog()?
            .iter()
            .any(|e| e.code == code && e.favorite))
    }

    pub fn launch_text(&self, code: &str, alternate: bool) -> Result<LaunchText> {
        let result =
            commands::launch::run(self.merged_catalog()?, self.settings.settings(), code, alternate)?;
        result
            .launch
            .ok_or_else(|| CatalogError::Api(format!("no launch text for {}", code)))
    }

    pub fn copy_text(&self, code: &str, alternate: bool) -> Result<CmdResult> {
        commands::launch::run(self.merged_catalog()?, self.settings.settings(), code, alternate)
    }

    // --- Writes ---

    pub fn add_entry(&mut self, entry: NewEntry) -> Result<CmdResult> {
        self.write(|store, reference, _| commands::add::run(store, reference, entry))
    }

    pub fn update_entry(&mut self, code: &str, update: EntryUpdate) -> Result<CmdResult> {
        self.write(|store, reference, _| commands::update::run(store, reference, code, update))
    }

    pub fn delete_entry(&mut self, code: &str) -> Result<CmdResult> {
        self.write(|store, reference, _| commands::delete::run(store, reference, code))
    }

    /// Returns the new favorite state of `code`.
    pub fn toggle_favorite(&mut self, code: &str) -> Result<bool> {
        self.write(|store, reference, _| commands::favorite::toggle(store, reference, code))?;
        self.is_favorite(code.trim())
    }

    pub fn set_favorite(&mut self, code: &str, favorite: bool) -> Result<CmdResult> {
        self.write(|store, reference, _| commands::favorite::set(store, reference, code, favorite))
    }

    pub fn reset_to_factory_defaults(&mut self) -> Result<CmdResult> {
        self.write(|store, _, _| commands::reset::run(store))
    }

    pub fn doctor(&mut self) -> Result<CmdResult> {
        self.write(|store, reference, _| commands::doctor::run(store, reference))
    }

    // --- Import / Export ---

    pub fn export_snapshot(&self) -> Result<Snapshot> {
        self.ensure_ready()?;
        commands::export::snapshot(&self.store, self.settings.settings())
    }

    pub fn export_to_file(&self, target: Option<&Path>, dir: &Path) -> Result<CmdResult> {
        self.ensure_ready()?;
        commands::export::run(&self.store, self.settings.settings(), target, dir)
    }

    pub fn import_snapshot(&mut self, document: &Value) -> Result<CmdResult> {
        self.write(|store, reference, settings| {
            commands::import::run(store, settings, reference, document)
        })
    }

    pub fn import_snapshot_str(&mut self, json: &str) -> Result<CmdResult> {
        self.write(|store, reference, settings| {
            commands::import::run_str(store, settings, reference, json)
        })
    }

    // --- Settings ---

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&mut self.settings, action)
    }

    /// Sets one setting from its string form, persisting immediately.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.set(key, value)
    }

    pub fn set_visible_groups<I, T>(&mut self, groups: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.settings.set_visible_groups(groups)
    }
}
