//! Combines the reference catalog with the user overlay.
//!
//! The merge is a pure function of its inputs. It is recomputed after every
//! write instead of being patched in place, which keeps the invariants easy
//! to state:
//!
//! - reference entries come first, in dataset order
//! - custom entries follow, ordered by code
//! - `favorite` is set exactly for codes present in the favorite set
//! - favorites pointing at codes that exist nowhere are dropped
//! - a custom entry shadowing a reference code is dropped, the reference wins

use crate::model::CatalogEntry;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

pub fn merge(
    reference: &[CatalogEntry],
    custom: Vec<CatalogEntry>,
    favorites: &BTreeSet<String>,
) -> Vec<CatalogEntry> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(reference.len() + custom.len());
    let mut merged = Vec::with_capacity(reference.len() + custom.len());

    for entry in reference {
        seen.insert(entry.code.as_str());
        let mut entry = entry.clone();
        entry.favorite = favorites.contains(&entry.code);
        merged.push(entry);
    }

    let mut custom = custom;
    custom.sort_by(|a, b| a.code.cmp(&b.code));
    for mut entry in custom {
        if seen.contains(entry.code.as_str()) {
            warn!(code = %entry.code, "custom entry shadows a reference entry, skipped");
            continue;
        }
        entry.favorite = favorites.contains(&entry.code);
        merged.push(entry);
    }

    merged
}

/// Favorites that point at no entry of the merged catalog.
pub fn dangling_favorites(
    merged: &[CatalogEntry],
    favorites: &BTreeSet<String>,
) -> BTreeSet<String> {
    let codes: HashSet<&str> = merged.iter().map(|e| e.code.as_str()).collect();
    favorites
        .iter()
        .filter(|code| !codes.contains(code.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewEntry, Origin};

    fn reference(code: &str, tag: &str) -> CatalogEntry {
        CatalogEntry {
            code: code.to_string(),
            title: String::new(),
            description: String::new(),
            tags: BTreeSet::from([tag.to_string()]),
            origin: Origin::Reference,
            favorite: false,
        }
    }

    fn custom(code: &str) -> CatalogEntry {
        NewEntry::new(code, "").normalized().unwrap().into_entry()
    }

    fn favorites(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn reference_then_custom_by_code() {
        let merged = merge(
            &[reference("SE11", "ABAP"), reference("FB03", "FI")],
            vec![custom("Z002"), custom("Z001")],
            &BTreeSet::new(),
        );
        let codes: Vec<_> = merged.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["SE11", "FB03", "Z001", "Z002"]);
    }

    #[test]
    fn annotates_favorites_on_both_origins() {
        let merged = merge(
            &[reference("SE11", "ABAP"), reference("FB03", "FI")],
            vec![custom("Z001")],
            &favorites(&["FB03", "Z001"]),
        );
        let flagged: Vec<_> = merged
            .iter()
            .filter(|e| e.favorite)
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(flagged, vec!["FB03", "Z001"]);
    }

    #[test]
    fn dangling_favorites_do_not_appear() {
        let merged = merge(
            &[reference("SE11", "ABAP")],
            Vec::new(),
            &favorites(&["GONE"]),
        );
        assert_eq!(merged.len(), 1);
        assert!(!merged[0].favorite);
        assert_eq!(
            dangling_favorites(&merged, &favorites(&["GONE", "SE11"])),
            favorites(&["GONE"])
        );
    }

    #[test]
    fn reference_wins_over_shadowing_custom() {
        let merged = merge(&[reference("SE11", "ABAP")], vec![custom("SE11")], &BTreeSet::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].origin, Origin::Reference);
    }

    #[test]
    fn merge_is_deterministic() {
        let reference = [reference("SE11", "ABAP")];
        let favs = favorites(&["Z1"]);
        let a = merge(&reference, vec![custom("Z2"), custom("Z1")], &favs);
        let b = merge(&reference, vec![custom("Z1"), custom("Z2")], &favs);
        assert_eq!(a, b);
    }
}
