//! Tag normalization.
//!
//! Tags come from two places: a multi-select over a fixed preset list and a
//! free-text comma-separated field. Both end up in one canonical [`TagSet`],
//! persisted as a single `", "`-joined string in sorted order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used when a tag set is written out.
pub const TAG_SEPARATOR: &str = ", ";

/// Preset categories offered when no config overrides them.
pub const DEFAULT_PRESET_TAGS: &[&str] = &[
    "Gene Therapy",
    "Cell Therapy",
    "Targets",
    "Clinical",
    "AI",
    "Methodology",
];

/// A deduplicated, lexicographically ordered set of tags.
///
/// Never holds an empty or whitespace-only tag. Equality is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag after trimming it. Returns `false` for empty input or a
    /// tag already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag.to_string())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn extend(&mut self, other: TagSet) {
        self.0.extend(other.0);
    }

    /// Sorted tags as owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// The persisted form, see [`serialize`].
    pub fn serialize(&self) -> String {
        serialize(self.iter())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Category field as returned by the metadata extractor: sometimes a bare
/// string, sometimes a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    Scalar(String),
    List(Vec<String>),
}

impl TagsField {
    /// The raw items; a scalar becomes a one-element collection.
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }

    /// Canonical set: the items serialized and parsed back, so a scalar
    /// holding `"AI, Cancer"` yields two tags.
    pub fn normalize(&self) -> TagSet {
        parse_tag_string(&serialize(self.items()))
    }
}

impl Default for TagsField {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for TagsField {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for TagsField {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Partitions incoming tags into exact preset matches and everything else.
///
/// Order of first appearance is kept within each half and repeats are
/// dropped. Nothing is trimmed here; a padded preset name lands in the custom
/// half and is cleaned up by [`merge`].
pub fn split_preset_and_custom<S: AsRef<str>>(
    raw_tags: &TagsField,
    preset: &[S],
) -> (Vec<String>, Vec<String>) {
    let preset: HashSet<&str> = preset.iter().map(AsRef::as_ref).collect();
    let mut seen = HashSet::new();
    let mut preset_subset = Vec::new();
    let mut custom_subset = Vec::new();

    for tag in raw_tags.items() {
        if !seen.insert(tag.clone()) {
            continue;
        }
        if preset.contains(tag.as_str()) {
            preset_subset.push(tag);
        } else {
            custom_subset.push(tag);
        }
    }

    (preset_subset, custom_subset)
}

/// Unions the selected tags with the pieces of `custom_csv`, dedups and sorts.
pub fn merge<S: AsRef<str>>(selected: &[S], custom_csv: &str) -> Vec<String> {
    let mut tags: TagSet = selected.iter().collect();
    tags.extend(parse_tag_string(custom_csv));
    tags.to_vec()
}

/// Joins tags with `", "`.
pub fn serialize<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}

/// Splits on comma, trims, drops empty pieces.
pub fn parse_tag_string(s: &str) -> TagSet {
    s.split(',').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset() -> Vec<String> {
        DEFAULT_PRESET_TAGS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_collapses_preset_repeated_in_custom() {
        assert_eq!(merge(&["AI"], "AI, Cancer"), vec!["AI", "Cancer"]);
    }

    #[test]
    fn test_merge_sorts_and_drops_empty() {
        let merged = merge(&["Targets", "Clinical"], " zebrafish , ,Aging,");
        assert_eq!(merged, vec!["Aging", "Clinical", "Targets", "zebrafish"]);
    }

    #[test]
    fn test_merge_is_case_sensitive() {
        assert_eq!(merge(&["AI"], "ai"), vec!["AI", "ai"]);
    }

    #[test]
    fn test_parse_tag_string_trims_and_drops_empty() {
        let tags = parse_tag_string("Gene Therapy, , AI,  ");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("Gene Therapy"));
        assert!(tags.contains("AI"));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_tag_string("").is_empty());
        assert!(parse_tag_string(" , ,").is_empty());
    }

    #[test]
    fn test_serialize_parse_is_idempotent() {
        for s in ["AI, Cancer", "Gene Therapy", "", "A, B, C"] {
            let once = parse_tag_string(s).serialize();
            let twice = parse_tag_string(&once).serialize();
            assert_eq!(once, twice);
        }
        assert_eq!(parse_tag_string("Cancer, AI").serialize(), "AI, Cancer");
    }

    #[test]
    fn test_split_scalar_is_singleton() {
        let (preset_tags, custom) = split_preset_and_custom(&TagsField::from("AI"), &preset());
        assert_eq!(preset_tags, vec!["AI"]);
        assert!(custom.is_empty());

        let (preset_tags, custom) =
            split_preset_and_custom(&TagsField::from("Single-cell"), &preset());
        assert!(preset_tags.is_empty());
        assert_eq!(custom, vec!["Single-cell"]);
    }

    #[test]
    fn test_split_keeps_suggestions_outside_preset() {
        let raw = TagsField::List(vec![
            "Clinical".into(),
            "CRISPR".into(),
            "AI".into(),
            "CRISPR".into(),
        ]);
        let (preset_tags, custom) = split_preset_and_custom(&raw, &preset());
        assert_eq!(preset_tags, vec!["Clinical", "AI"]);
        assert_eq!(custom, vec!["CRISPR"]);
    }

    #[test]
    fn test_split_then_merge_matches_parse_of_serialize() {
        let inputs = vec![
            TagsField::from("AI, Cancer"),
            TagsField::from("  Targets "),
            TagsField::List(vec![]),
            TagsField::List(vec!["AI".into(), "".into(), "Cancer ".into(), "AI".into()]),
            TagsField::List(vec!["Gene Therapy".into(), "Cell Therapy, Organoids".into()]),
        ];

        for raw in inputs {
            let (preset_tags, custom) = split_preset_and_custom(&raw, &preset());
            let merged: TagSet = merge(&preset_tags, &serialize(&custom)).into_iter().collect();
            let expected = parse_tag_string(&serialize(raw.items()));
            assert_eq!(merged, expected, "input {raw:?}");
            assert_eq!(raw.normalize(), expected);
        }
    }

    #[test]
    fn test_tags_field_deserializes_both_shapes() {
        let scalar: TagsField = serde_json::from_str("\"AI\"").unwrap();
        assert_eq!(scalar, TagsField::Scalar("AI".into()));

        let list: TagsField = serde_json::from_str("[\"AI\", \"Clinical\"]").unwrap();
        assert_eq!(list.items(), vec!["AI", "Clinical"]);
    }
}
