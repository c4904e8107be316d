//! Portable snapshot of the user overlay.
//!
//! The document has three optional sections:
//!
//! ```json
//! {
//!   "settings": { "copyOption": "...", "theme": "System", "visibleGroups": ["ABAP"] },
//!   "customTransactions": [{ "code": "Z001", "title": "...", "description": "...", "tags": ["CUSTOM"] }],
//!   "favoriteTransactions": [{ "code": "SE11" }]
//! }
//! ```
//!
//! Export always writes all three. Import validates the whole document into
//! an [`ImportPlan`] before anything is written; a plan is either applied in
//! full or not at all. Older files use `tcode` instead of `code`, which is
//! accepted on input.

use crate::error::ImportValidationError;
use crate::model::{CatalogEntry, NewEntry};
use crate::reference::ReferenceCatalog;
use crate::settings::Settings;
use crate::tags::{normalize_tags, TagField};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

const REQUIRED_SETTINGS: [&str; 3] = ["copyOption", "theme", "visibleGroups"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub code: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotFavorite {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub settings: Settings,
    pub custom_transactions: Vec<SnapshotEntry>,
    pub favorite_transactions: Vec<SnapshotFavorite>,
}

impl Snapshot {
    /// Entries and favorites are written sorted by code.
    pub fn capture(
        settings: &Settings,
        custom: Vec<CatalogEntry>,
        favorites: &BTreeSet<String>,
    ) -> Self {
        let mut custom_transactions: Vec<SnapshotEntry> = custom
            .into_iter()
            .map(|e| SnapshotEntry {
                code: e.code,
                title: e.title,
                description: e.description,
                tags: e.tags,
            })
            .collect();
        custom_transactions.sort_by(|a, b| a.code.cmp(&b.code));

        Self {
            settings: settings.clone(),
            custom_transactions,
            favorite_transactions: favorites
                .iter()
                .map(|code| SnapshotFavorite { code: code.clone() })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Deserialize)]
struct ImportedEntry {
    #[serde(alias = "tcode")]
    code: String,
    title: String,
    description: String,
    #[serde(default)]
    tags: TagField,
}

/// A validated import. `None` sections leave the current state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub settings: Option<Settings>,
    pub entries: Option<Vec<NewEntry>>,
    pub favorites: Option<BTreeSet<String>>,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.settings.is_none() && self.entries.is_none() && self.favorites.is_none()
    }
}

/// `null` counts as absent, like a missing key.
fn section<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

fn code_field(record: &Map<String, Value>) -> Option<&Value> {
    record.get("code").or_else(|| record.get("tcode"))
}

pub fn validate(
    document: &Value,
    reference: &ReferenceCatalog,
) -> Result<ImportPlan, ImportValidationError> {
    let doc = document.as_object().ok_or_else(|| {
        ImportValidationError::Malformed("expected a JSON object at the top level".into())
    })?;

    let settings = section(doc, "settings").map(validate_settings).transpose()?;
    let entries = section(doc, "customTransactions")
        .map(|v| validate_entries(v, reference))
        .transpose()?;
    let favorites = section(doc, "favoriteTransactions")
        .map(validate_favorites)
        .transpose()?;

    Ok(ImportPlan {
        settings,
        entries,
        favorites,
    })
}

pub fn validate_str(
    json: &str,
    reference: &ReferenceCatalog,
) -> Result<ImportPlan, ImportValidationError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| ImportValidationError::Malformed(e.to_string()))?;
    validate(&document, reference)
}

fn validate_settings(value: &Value) -> Result<Settings, ImportValidationError> {
    let map = value
        .as_object()
        .ok_or_else(|| ImportValidationError::Settings("expected an object".into()))?;

    for key in REQUIRED_SETTINGS {
        if !map.contains_key(key) {
            return Err(ImportValidationError::Settings(format!(
                "missing required key '{}'",
                key
            )));
        }
    }
    if !map["visibleGroups"].is_array() {
        return Err(ImportValidationError::Settings(
            "visibleGroups must be an array".into(),
        ));
    }

    let mut settings: Settings = serde_json::from_value(value.clone())
        .map_err(|e| ImportValidationError::Settings(e.to_string()))?;
    settings.visible_groups = normalize_tags(&settings.visible_groups)
        .map_err(|e| ImportValidationError::Settings(e.to_string()))?;
    Ok(settings)
}

fn validate_entries(
    value: &Value,
    reference: &ReferenceCatalog,
) -> Result<Vec<NewEntry>, ImportValidationError> {
    let items = value.as_array().ok_or_else(|| {
        ImportValidationError::Malformed("customTransactions must be an array".into())
    })?;

    let mut seen = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let invalid = |reason: &str| ImportValidationError::CustomEntry {
            index,
            reason: reason.to_string(),
        };

        let record = item.as_object().ok_or_else(|| invalid("expected an object"))?;
        if !code_field(record).is_some_and(Value::is_string) {
            return Err(invalid("code must be a string"));
        }
        for field in ["title", "description"] {
            if !record.get(field).is_some_and(Value::is_string) {
                return Err(invalid(&format!("{} must be a string", field)));
            }
        }

        let imported: ImportedEntry =
            serde_json::from_value(item.clone()).map_err(|e| invalid(&e.to_string()))?;
        let entry = NewEntry::new(imported.code, imported.title)
            .with_description(imported.description)
            .with_tags(imported.tags.into_vec())
            .normalized()
            .map_err(|e| invalid(&e.to_string()))?;

        if reference.contains(&entry.code) {
            return Err(ImportValidationError::ReferenceCollision(entry.code));
        }
        if !seen.insert(entry.code.clone()) {
            return Err(ImportValidationError::DuplicateInImport(entry.code));
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn validate_favorites(value: &Value) -> Result<BTreeSet<String>, ImportValidationError> {
    let items = value.as_array().ok_or_else(|| {
        ImportValidationError::Malformed("favoriteTransactions must be an array".into())
    })?;

    let mut favorites = BTreeSet::new();
    for (index, item) in items.iter().enumerate() {
        let code = item
            .as_object()
            .and_then(code_field)
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| ImportValidationError::Favorite {
                index,
                reason: "code must be a string".into(),
            })?;
        if code.is_empty() {
            return Err(ImportValidationError::Favorite {
                index,
                reason: "code cannot be empty".into(),
            });
        }
        favorites.insert(code.to_string());
    }
    Ok(favorites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CopyOption;
    use serde_json::json;

    fn reference() -> ReferenceCatalog {
        ReferenceCatalog::from_json_str(r#"[{"code": "SE11", "tags": ["ABAP"]}]"#).unwrap()
    }

    #[test]
    fn empty_document_changes_nothing() {
        let plan = validate(&json!({}), &reference()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn rejects_non_object_document() {
        let err = validate(&json!([1, 2]), &reference()).unwrap_err();
        assert!(matches!(err, ImportValidationError::Malformed(_)));
        let err = validate_str("{not json", &reference()).unwrap_err();
        assert!(matches!(err, ImportValidationError::Malformed(_)));
    }

    #[test]
    fn entry_missing_title_is_rejected() {
        let err = validate(&json!({"customTransactions": [{"code": "Z1"}]}), &reference())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportValidationError::CustomEntry { index: 0, .. }
        ));
    }

    #[test]
    fn settings_require_minimum_keys() {
        let err = validate(
            &json!({"settings": {"copyOption": "Just copy T-Code", "theme": "Dark"}}),
            &reference(),
        )
        .unwrap_err();
        assert!(matches!(err, ImportValidationError::Settings(_)));

        let err = validate(
            &json!({"settings": {"copyOption": "Just copy T-Code", "theme": "Dark", "visibleGroups": "ABAP"}}),
            &reference(),
        )
        .unwrap_err();
        assert!(matches!(err, ImportValidationError::Settings(_)));
    }

    #[test]
    fn accepts_full_legacy_document() {
        let doc = json!({
            "settings": {
                "copyOption": "Just copy T-Code",
                "sapSystemUrl": "",
                "resetSearchAfterCopy": "true",
                "theme": "Light",
                "visibleGroups": ["abap", "CUSTOM"]
            },
            "customTransactions": [
                {"tcode": "ZTOOL", "title": "Tool", "description": "d", "tags": "abap"},
                {"tcode": "ZOTHER", "title": "", "description": ""}
            ],
            "favoriteTransactions": [{"tcode": "SE11"}, {"code": "ZTOOL"}]
        });
        let plan = validate(&doc, &reference()).unwrap();

        let settings = plan.settings.unwrap();
        assert_eq!(settings.copy_option, CopyOption::JustCopy);
        assert!(settings.visible_groups.contains("ABAP"));

        let entries = plan.entries.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].tags.contains("ABAP"));
        assert!(entries[1].tags.contains("CUSTOM"));

        let favorites = plan.favorites.unwrap();
        assert!(favorites.contains("SE11") && favorites.contains("ZTOOL"));
    }

    #[test]
    fn rejects_reference_collision_and_duplicates() {
        let collide = json!({"customTransactions": [
            {"code": "SE11", "title": "", "description": ""}
        ]});
        assert_eq!(
            validate(&collide, &reference()).unwrap_err(),
            ImportValidationError::ReferenceCollision("SE11".into())
        );

        let dupes = json!({"customTransactions": [
            {"code": "Z1", "title": "", "description": ""},
            {"code": " Z1 ", "title": "", "description": ""}
        ]});
        assert_eq!(
            validate(&dupes, &reference()).unwrap_err(),
            ImportValidationError::DuplicateInImport("Z1".into())
        );
    }

    #[test]
    fn favorite_without_code_is_rejected() {
        let err = validate(
            &json!({"favoriteTransactions": [{"code": "SE11"}, {"name": "x"}]}),
            &reference(),
        )
        .unwrap_err();
        assert!(matches!(err, ImportValidationError::Favorite { index: 1, .. }));
    }

    #[test]
    fn capture_sorts_entries() {
        let custom = vec![
            NewEntry::new("Z2", "b").normalized().unwrap().into_entry(),
            NewEntry::new("Z1", "a").normalized().unwrap().into_entry(),
        ];
        let snapshot = Snapshot::capture(
            &Settings::default(),
            custom,
            &BTreeSet::from(["SE11".to_string()]),
        );
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["customTransactions"][0]["code"], "Z1");
        assert_eq!(json["favoriteTransactions"][0]["code"], "SE11");
        assert!(json["settings"]["visibleGroups"].is_array());
    }
}
