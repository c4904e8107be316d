use super::{EntryStore, FavoriteStore, OverlayStore};
use crate::error::{EntryError, Result};
use crate::model::{CatalogEntry, EntryUpdate, NewEntry};
use std::collections::{BTreeSet, HashMap};

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    entries: HashMap<String, CatalogEntry>,
    favorites: BTreeSet<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for InMemoryStore {
    fn add_entry(&mut self, entry: &NewEntry) -> Result<()> {
        if self.entries.contains_key(&entry.code) {
            return Err(EntryError::DuplicateCode(entry.code.clone()).into());
        }
        self.entries
            .insert(entry.code.clone(), entry.clone().into_entry());
        Ok(())
    }

    fn update_entry(&mut self, code: &str, update: &EntryUpdate) -> Result<()> {
        let entry = self
            .entries
            .get_mut(code)
            .ok_or_else(|| EntryError::NotFound(code.to_string()))?;
        entry.title = update.title.clone();
        entry.description = update.description.clone();
        if let Some(tags) = &update.tags {
            entry.tags = tags.clone();
        }
        Ok(())
    }

    fn delete_entry(&mut self, code: &str) -> Result<bool> {
        let removed = self.entries.remove(code).is_some();
        if removed {
            self.favorites.remove(code);
        }
        Ok(removed)
    }

    fn clear_entries(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn list_entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.values().cloned().collect())
    }
}

impl FavoriteStore for InMemoryStore {
    fn add_favorite(&mut self, code: &str) -> Result<()> {
        self.favorites.insert(code.to_string());
        Ok(())
    }

    fn remove_favorite(&mut self, code: &str) -> Result<()> {
        self.favorites.remove(code);
        Ok(())
    }

    fn list_favorites(&self) -> Result<BTreeSet<String>> {
        Ok(self.favorites.clone())
    }

    fn clear_favorites(&mut self) -> Result<()> {
        self.favorites.clear();
        Ok(())
    }
}

impl OverlayStore for InMemoryStore {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn replace_overlay(
        &mut self,
        entries: Option<&[NewEntry]>,
        favorites: Option<&BTreeSet<String>>,
    ) -> Result<()> {
        // Build the replacement first so a duplicate leaves the store untouched.
        let next_entries = match entries {
            Some(entries) => {
                let mut map = HashMap::with_capacity(entries.len());
                for entry in entries {
                    if map
                        .insert(entry.code.clone(), entry.clone().into_entry())
                        .is_some()
                    {
                        return Err(EntryError::DuplicateCode(entry.code.clone()).into());
                    }
                }
                Some(map)
            }
            None => None,
        };

        if let Some(map) = next_entries {
            self.entries = map;
        }
        if let Some(favorites) = favorites {
            self.favorites = favorites.clone();
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_entries(mut self, count: usize) -> Self {
            for i in 0..count {
                let entry = NewEntry::new(format!("Z{:03}", i + 1), format!("Custom {}", i + 1))
                    .normalized()
                    .unwrap();
                self.store.add_entry(&entry).unwrap();
            }
            self
        }

        pub fn with_entry(mut self, code: &str, title: &str, tags: &[&str]) -> Self {
            let entry = NewEntry::new(code, title)
                .with_tags(tags.iter().copied())
                .normalized()
                .unwrap();
            self.store.add_entry(&entry).unwrap();
            self
        }

        pub fn with_favorite(mut self, code: &str) -> Self {
            self.store.add_favorite(code).unwrap();
            self
        }
    }
}
