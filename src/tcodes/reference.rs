//! The immutable reference catalog.
//!
//! Loaded once at startup and never written back. Records are JSON objects
//! with `code` (or the older `tcode`), `title`, `description` and `tags`.

use crate::error::{CatalogError, Result};
use crate::model::{CatalogEntry, Origin};
use crate::tags::{normalize_tags, TagField, DEFAULT_REFERENCE_TAG};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::warn;

const BUNDLED_DATASET: &str = include_str!("../../data/transactions.json");

#[derive(Debug, Deserialize)]
struct ReferenceRecord {
    #[serde(alias = "tcode")]
    code: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: TagField,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    entries: Vec<CatalogEntry>,
    codes: HashSet<String>,
}

impl ReferenceCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the catalog from entries, keeping the first of any duplicate code.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut catalog = Self::default();
        for mut entry in entries {
            if catalog.codes.contains(&entry.code) {
                warn!(code = %entry.code, "duplicate reference code ignored");
                continue;
            }
            entry.origin = Origin::Reference;
            entry.favorite = false;
            catalog.codes.insert(entry.code.clone());
            catalog.entries.push(entry);
        }
        catalog
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ReferenceRecord> = serde_json::from_str(json)
            .map_err(|e| CatalogError::Reference(format!("invalid dataset: {}", e)))?;

        let mut entries = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            let code = record.code.trim().to_string();
            if code.is_empty() {
                return Err(CatalogError::Reference(format!(
                    "record {} has an empty code",
                    position
                )));
            }
            let mut tags = normalize_tags(record.tags.into_vec()).map_err(|e| {
                CatalogError::Reference(format!("record {} ({}): {}", position, code, e))
            })?;
            if tags.is_empty() {
                tags.insert(DEFAULT_REFERENCE_TAG.to_string());
            }
            entries.push(CatalogEntry {
                code,
                title: record.title,
                description: record.description,
                tags,
                origin: Origin::Reference,
                favorite: false,
            });
        }

        Ok(Self::from_entries(entries))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CatalogError::Reference(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// The dataset shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DATASET)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every tag used by at least one reference entry.
    pub fn tags(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .flat_map(|e| e.tags.iter().cloned())
            .collect()
    }
}
