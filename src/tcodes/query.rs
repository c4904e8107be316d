//! Read-only views over the merged catalog.
//!
//! Every function here takes a slice and returns a new collection; the
//! merged catalog is never mutated by a query.

use crate::error::EntryError;
use crate::model::CatalogEntry;
use crate::tags::{normalize_tag, KNOWN_TAGS};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Sentinel tag selecting every visible group.
pub const ALL: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl FromStr for TagFilter {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL) {
            return Ok(TagFilter::All);
        }
        normalize_tag(s).map(TagFilter::Tag)
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFilter::All => write!(f, "{}", ALL),
            TagFilter::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

/// Order of codes beneath the favorites block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!(
                "Unknown sort order '{}' (expected ascending or descending)",
                other
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "Ascending"),
            SortOrder::Descending => write!(f, "Descending"),
        }
    }
}

/// A combined search + tag selection, as issued by a list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub search: String,
    pub tag: TagFilter,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_tag(mut self, tag: TagFilter) -> Self {
        self.tag = tag;
        self
    }

    /// Search, then tag filter, then sort.
    pub fn apply(
        &self,
        entries: &[CatalogEntry],
        visible: &BTreeSet<String>,
        order: SortOrder,
    ) -> Vec<CatalogEntry> {
        let found = search(entries, &self.search);
        let mut filtered = filter_by_tag(&found, &self.tag, visible);
        sort(&mut filtered, order);
        filtered
    }
}

fn matches(entry: &CatalogEntry, needle: &str) -> bool {
    entry.code.to_lowercase().contains(needle)
        || entry.title.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
}

/// Case-insensitive substring match on code, title or description.
/// Surrounding whitespace is trimmed from the query first, so `" SE"` matches
/// like `"SE"`. A blank query matches everything.
pub fn search(entries: &[CatalogEntry], query: &str) -> Vec<CatalogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| matches(e, &needle))
        .cloned()
        .collect()
}

pub fn filter_by_tag(
    entries: &[CatalogEntry],
    filter: &TagFilter,
    visible: &BTreeSet<String>,
) -> Vec<CatalogEntry> {
    entries
        .iter()
        .filter(|e| match filter {
            TagFilter::All => e.has_any_tag(visible),
            TagFilter::Tag(tag) => e.has_tag(tag),
        })
        .cloned()
        .collect()
}

fn compare(a: &CatalogEntry, b: &CatalogEntry, order: SortOrder) -> Ordering {
    let by_code = match order {
        SortOrder::Ascending => a.code.cmp(&b.code),
        SortOrder::Descending => b.code.cmp(&a.code),
    };
    b.favorite.cmp(&a.favorite).then(by_code)
}

/// Favorites first, then by code.
pub fn sort(entries: &mut [CatalogEntry], order: SortOrder) {
    entries.sort_by(|a, b| compare(a, b, order));
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagCounts {
    /// Entries carrying at least one visible tag, each counted once.
    pub all: usize,
    pub per_tag: BTreeMap<String, usize>,
}

impl TagCounts {
    pub fn get(&self, tag: &str) -> usize {
        if tag.eq_ignore_ascii_case(ALL) {
            return self.all;
        }
        self.per_tag.get(tag).copied().unwrap_or(0)
    }
}

/// Counts per tag after search filtering. Every known tag gets a bucket,
/// including ones with no entries.
pub fn tag_counts(
    entries: &[CatalogEntry],
    query: &str,
    visible: &BTreeSet<String>,
) -> TagCounts {
    let found = search(entries, query);

    let mut per_tag: BTreeMap<String, usize> =
        KNOWN_TAGS.iter().map(|t| (t.to_string(), 0)).collect();
    let mut all = 0;

    for entry in &found {
        for tag in &entry.tags {
            *per_tag.entry(tag.clone()).or_insert(0) += 1;
        }
        if entry.has_any_tag(visible) {
            all += 1;
        }
    }

    TagCounts { all, per_tag }
}
