use crate::error::EntryError;
use crate::tags::{normalize_tags, DEFAULT_CUSTOM_TAG};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where an entry comes from. Reference entries are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Reference,
    Custom,
}

/// One transaction code as seen by the presentation layer.
///
/// `favorite` is derived during the merge; stores never carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub origin: Origin,
    #[serde(default)]
    pub favorite: bool,
}

impl CatalogEntry {
    pub fn custom(code: String, title: String, description: String, tags: BTreeSet<String>) -> Self {
        Self {
            code,
            title,
            description,
            tags,
            origin: Origin::Custom,
            favorite: false,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.origin == Origin::Custom
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// Input for creating a custom entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub code: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
}

impl NewEntry {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            description: String::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Trims the code, normalizes tags and applies the `CUSTOM` default.
    pub fn normalized(self) -> Result<Self, EntryError> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(EntryError::EmptyCode);
        }
        let mut tags = normalize_tags(self.tags)?;
        if tags.is_empty() {
            tags.insert(DEFAULT_CUSTOM_TAG.to_string());
        }
        Ok(Self {
            code,
            title: self.title,
            description: self.description,
            tags,
        })
    }

    pub fn into_entry(self) -> CatalogEntry {
        CatalogEntry::custom(self.code, self.title, self.description, self.tags)
    }
}

/// Mutable fields of a custom entry. `None` tags keeps the current set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryUpdate {
    pub title: String,
    pub description: String,
    pub tags: Option<BTreeSet<String>>,
}

impl EntryUpdate {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: None,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn normalized(self) -> Result<Self, EntryError> {
        let tags = match self.tags {
            Some(tags) => {
                let mut tags = normalize_tags(tags)?;
                if tags.is_empty() {
                    tags.insert(DEFAULT_CUSTOM_TAG.to_string());
                }
                Some(tags)
            }
            None => None,
        };
        Ok(Self { tags, ..self })
    }
}
