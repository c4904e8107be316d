//! # Storage Layer
//!
//! This module defines the storage abstraction for the user overlay: the
//! custom entries a user created and the set of codes they favorited. The
//! reference catalog is never stored here.
//!
//! ## Two Stores, One Backend
//!
//! [`EntryStore`] and [`FavoriteStore`] are separate contracts. Favorites are
//! a weak reference by code: any code can be favorited, reference or custom,
//! and a favorite for a code that no longer exists is harmless. The only
//! coupling is the delete cascade: removing a custom entry also removes its
//! favorite.
//!
//! Both traits are implemented by a single backend so that multi-record
//! operations ([`OverlayStore::replace_overlay`]) can be applied atomically.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteStore`]: Production storage, one SQLite file
//!   - Versioned schema, see [`schema`] for the migration contract
//!   - Every write runs in its own transaction
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Fast, isolated test execution
//!
//! ## Storage Format
//!
//! ```text
//! <data dir>/
//! ├── catalog.db      # entries + favorites + schema_version tables
//! └── settings.json   # user preferences (see settings.rs)
//! ```

use crate::error::Result;
use crate::model::{CatalogEntry, EntryUpdate, NewEntry};
use std::collections::BTreeSet;

pub mod memory;
pub mod schema;
pub mod sqlite;

/// Durable storage for custom entries, keyed by code.
pub trait EntryStore {
    /// Insert a new entry. Fails with `EntryError::DuplicateCode` when the code
    /// is already stored. Collisions with the reference catalog are the
    /// caller's concern.
    fn add_entry(&mut self, entry: &NewEntry) -> Result<()>;

    /// Replace title, description and (optionally) tags of an existing entry.
    /// Fails with `EntryError::NotFound` when the code is absent.
    fn update_entry(&mut self, code: &str, update: &EntryUpdate) -> Result<()>;

    /// Remove an entry and its favorite membership. Absent codes are a no-op.
    /// Returns whether an entry was removed.
    fn delete_entry(&mut self, code: &str) -> Result<bool>;

    /// Remove every custom entry.
    fn clear_entries(&mut self) -> Result<()>;

    /// All custom entries, `origin = Custom`, in no particular order.
    fn list_entries(&self) -> Result<Vec<CatalogEntry>>;
}

/// Durable set of favorited codes.
pub trait FavoriteStore {
    /// Idempotent.
    fn add_favorite(&mut self, code: &str) -> Result<()>;

    /// Idempotent.
    fn remove_favorite(&mut self, code: &str) -> Result<()>;

    fn list_favorites(&self) -> Result<BTreeSet<String>>;

    fn clear_favorites(&mut self) -> Result<()>;
}

/// A backend holding both halves of the overlay.
pub trait OverlayStore: EntryStore + FavoriteStore {
    /// Open or create the backing storage, migrating older schemas.
    fn open(&mut self) -> Result<()>;

    /// Replace the overlay in one atomic step. `None` leaves that half
    /// untouched; `Some` clears it and inserts the given records.
    fn replace_overlay(
        &mut self,
        entries: Option<&[NewEntry]>,
        favorites: Option<&BTreeSet<String>>,
    ) -> Result<()>;
}
