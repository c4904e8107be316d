//! Tag vocabulary and tag name rules.
//!
//! Tags group transaction codes (`ABAP`, `UI5`, ...). The vocabulary below is
//! what ships with the reference catalog; users may introduce new tags on
//! their custom entries, which then count as known tags as well.
//!
//! Valid tags:
//! - ASCII alphanumeric characters, underscores (`_`), and hyphens (`-`)
//! - Must start with a letter
//! - Cannot have consecutive hyphens (`--`) or end with a hyphen
//!
//! Tags are compared after normalization (trimmed, upper-cased).

use crate::error::EntryError;
use serde::Deserialize;
use std::collections::BTreeSet;

pub const KNOWN_TAGS: [&str; 7] = ["GENERAL", "UI5", "ABAP", "EWM", "ERP", "FI", "CUSTOM"];

/// Tag given to custom entries created without any tag.
pub const DEFAULT_CUSTOM_TAG: &str = "CUSTOM";

/// Tag given to reference records that carry none.
pub const DEFAULT_REFERENCE_TAG: &str = "GENERAL";

pub fn known_tags() -> BTreeSet<String> {
    KNOWN_TAGS.iter().map(|t| t.to_string()).collect()
}

/// Validates a normalized tag name.
///
/// ```
/// use tcodes::tags::validate_tag_name;
///
/// assert!(validate_tag_name("ABAP").is_ok());
/// assert!(validate_tag_name("S4-HANA").is_ok());
/// assert!(validate_tag_name("").is_err());
/// assert!(validate_tag_name("4FUN").is_err());
/// assert!(validate_tag_name("FOO--BAR").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TagValidationError> {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Err(TagValidationError::Empty),
    };
    if !first.is_ascii_alphabetic() {
        return Err(TagValidationError::InvalidStart(first));
    }
    if name.ends_with('-') {
        return Err(TagValidationError::EndsWithHyphen);
    }

    let mut prev_was_hyphen = false;
    for ch in name.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(TagValidationError::InvalidCharacter(ch));
        }
        if ch == '-' && prev_was_hyphen {
            return Err(TagValidationError::ConsecutiveHyphens);
        }
        prev_was_hyphen = ch == '-';
    }

    Ok(())
}

pub fn normalize_tag(raw: &str) -> Result<String, EntryError> {
    let tag = raw.trim().to_ascii_uppercase();
    validate_tag_name(&tag).map_err(|e| EntryError::InvalidTag {
        tag: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(tag)
}

pub fn normalize_tags<I, T>(raw: I) -> Result<BTreeSet<String>, EntryError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    raw.into_iter().map(|t| normalize_tag(t.as_ref())).collect()
}

/// Serializes a tag set for a single storage column.
pub fn encode_tags(tags: &BTreeSet<String>) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Reads a tag column. Accepts a JSON array, or the legacy forms: a single
/// tag (`CUSTOM`) or a comma separated list.
pub fn decode_tags(raw: &str) -> BTreeSet<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed) {
            return tags.into_iter().collect();
        }
    }
    trimmed
        .split(',')
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tags as they appear in JSON documents: a list, or a single string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagField {
    One(String),
    Many(Vec<String>),
}

impl Default for TagField {
    fn default() -> Self {
        TagField::Many(Vec::new())
    }
}

impl TagField {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagField::One(tag) if tag.trim().is_empty() => Vec::new(),
            TagField::One(tag) => vec![tag],
            TagField::Many(tags) => tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    Empty,
    InvalidStart(char),
    EndsWithHyphen,
    ConsecutiveHyphens,
    InvalidCharacter(char),
}

impl std::fmt::Display for TagValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValidationError::Empty => write!(f, "tag name cannot be empty"),
            TagValidationError::InvalidStart(ch) => {
                write!(f, "tag name must start with a letter, found '{}'", ch)
            }
            TagValidationError::EndsWithHyphen => write!(f, "tag name cannot end with a hyphen"),
            TagValidationError::ConsecutiveHyphens => {
                write!(f, "tag name cannot contain consecutive hyphens")
            }
            TagValidationError::InvalidCharacter(ch) => write!(
                f,
                "tag name contains invalid character '{}' (only alphanumeric, underscore, and hyphen allowed)",
                ch
            ),
        }
    }
}

impl std::error::Error for TagValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vocabulary_is_valid() {
        for tag in KNOWN_TAGS {
            assert!(validate_tag_name(tag).is_ok(), "{tag}");
        }
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(
            validate_tag_name("FOO BAR"),
            Err(TagValidationError::InvalidCharacter(' '))
        );
        assert_eq!(
            validate_tag_name("FOO.BAR"),
            Err(TagValidationError::InvalidCharacter('.'))
        );
    }

    #[test]
    fn rejects_trailing_hyphen() {
        assert_eq!(
            validate_tag_name("FOO-"),
            Err(TagValidationError::EndsWithHyphen)
        );
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_tag("  ewm ").unwrap(), "EWM");
    }

    #[test]
    fn normalize_reports_original_input() {
        let err = normalize_tag("-x").unwrap_err();
        assert!(matches!(err, EntryError::InvalidTag { ref tag, .. } if tag == "-x"));
    }

    #[test]
    fn decode_accepts_json_array() {
        let tags = decode_tags(r#"["ABAP","UI5"]"#);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("UI5"));
    }

    #[test]
    fn decode_accepts_legacy_single_tag() {
        let tags = decode_tags("CUSTOM");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["CUSTOM"]);
    }

    #[test]
    fn decode_accepts_comma_list() {
        let tags = decode_tags("abap, fi");
        assert!(tags.contains("ABAP"));
        assert!(tags.contains("FI"));
    }

    #[test]
    fn tag_field_accepts_single_string() {
        let field: TagField = serde_json::from_str(r#""ABAP""#).unwrap();
        assert_eq!(field.into_vec(), vec!["ABAP"]);
        let field: TagField = serde_json::from_str(r#""""#).unwrap();
        assert!(field.into_vec().is_empty());
    }

    #[test]
    fn encode_then_decode_preserves_set() {
        let tags: BTreeSet<String> = ["FI", "ERP"].iter().map(|s| s.to_string()).collect();
        assert_eq!(decode_tags(&encode_tags(&tags)), tags);
    }
}
