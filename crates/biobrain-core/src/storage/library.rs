//! Library view helpers over already loaded records.

use std::str::FromStr;

use serde::Serialize;

use crate::models::PaperRecord;
use crate::tags::TagSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    #[default]
    NewestFirst,
    InsertionOrder,
}

impl std::fmt::Display for ListOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewestFirst => write!(f, "newest"),
            Self::InsertionOrder => write!(f, "insertion"),
        }
    }
}

impl FromStr for ListOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "newest_first" => Ok(Self::NewestFirst),
            "insertion" | "insertion_order" => Ok(Self::InsertionOrder),
            _ => Err(format!("Invalid ListOrder: {s}")),
        }
    }
}

/// Orders records read in insertion order. Newest-first is a stable sort, so
/// records sharing a `date_added` keep their insertion order.
pub fn sort_records(records: &mut [PaperRecord], order: ListOrder) {
    if order == ListOrder::NewestFirst {
        records.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    }
}

/// Records whose tag string contains `tag`, ignoring case.
///
/// This is a "contains" match, not set membership: `"AI"` also selects a
/// record tagged `"AI & Bioinformatics"`. Older rows were written with a
/// different tag vocabulary and rely on it.
pub fn filter_by_tag(records: &[PaperRecord], tag: &str) -> Vec<PaperRecord> {
    let needle = tag.to_lowercase();
    records
        .iter()
        .filter(|r| r.tag_string().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Every tag used across `records`, sorted and deduplicated.
pub fn distinct_tags(records: &[PaperRecord]) -> Vec<String> {
    let mut all = TagSet::new();
    for record in records {
        all.extend(record.tags.clone());
    }
    all.to_vec()
}
