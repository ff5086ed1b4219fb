//! The fixed column set shared by every backend, and the mapping between a
//! raw stored row and a [`PaperRecord`].

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::coerce::{coerce_date, coerce_int};
use super::error::StoreResult;
use crate::models::{format_date, Paper, PaperRecord, RecordId, DEFAULT_RATING};
use crate::tags::parse_tag_string;

pub const COL_DATE_ADDED: &str = "date_added";
pub const COL_TITLE: &str = "title";
pub const COL_AUTHOR: &str = "author";
/// Name the SQLite table uses for the author column.
pub const COL_FIRST_AUTHOR: &str = "first_author";
pub const COL_YEAR: &str = "year";
pub const COL_CATEGORY: &str = "category";
pub const COL_PROBLEM_SOLVED: &str = "problem_solved";
pub const COL_KEY_FINDING: &str = "key_finding";
pub const COL_METHODOLOGY: &str = "methodology";
pub const COL_LIMITATION: &str = "limitation";
pub const COL_RATING: &str = "rating";

/// Column order of a freshly created worksheet.
pub const COLUMNS: [&str; 10] = [
    COL_DATE_ADDED,
    COL_TITLE,
    COL_AUTHOR,
    COL_YEAR,
    COL_CATEGORY,
    COL_PROBLEM_SOLVED,
    COL_KEY_FINDING,
    COL_METHODOLOGY,
    COL_LIMITATION,
    COL_RATING,
];

/// A stored row as column name to text. Absent columns and NULLs are simply
/// missing.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    values: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
}

/// Decodes a raw row. `row` is the 1-based position used in error messages.
pub fn decode_row(row: usize, id: RecordId, raw: &RawRow) -> StoreResult<PaperRecord> {
    let author = raw
        .get(COL_AUTHOR)
        .or_else(|| raw.get(COL_FIRST_AUTHOR))
        .unwrap_or_default()
        .to_string();

    Ok(PaperRecord {
        id,
        date_added: coerce_date(row, raw.get(COL_DATE_ADDED)),
        title: raw.text(COL_TITLE),
        author,
        year: coerce_int(row, COL_YEAR, raw.get(COL_YEAR), None)?,
        tags: parse_tag_string(raw.get(COL_CATEGORY).unwrap_or_default()),
        problem_solved: raw.text(COL_PROBLEM_SOLVED),
        key_finding: raw.text(COL_KEY_FINDING),
        methodology: raw.text(COL_METHODOLOGY),
        limitation: raw.text(COL_LIMITATION),
        rating: coerce_int(row, COL_RATING, raw.get(COL_RATING), Some(DEFAULT_RATING))?,
    })
}

/// Decodes a row, logging and dropping it when a value is unusable. Reads
/// of the library go through here so that one damaged row leaves the others
/// readable.
pub fn decode_or_skip(row: usize, id: RecordId, raw: &RawRow) -> Option<PaperRecord> {
    match decode_row(row, id, raw) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(row, %err, "skipping unreadable row");
            None
        }
    }
}

/// Encodes a paper for writing, in [`COLUMNS`] order.
pub fn encode_paper(paper: &Paper, date_added: &NaiveDateTime) -> [(&'static str, String); 10] {
    [
        (COL_DATE_ADDED, format_date(date_added)),
        (COL_TITLE, paper.title.clone()),
        (COL_AUTHOR, paper.author.clone()),
        (COL_YEAR, paper.year.to_string()),
        (COL_CATEGORY, paper.tags.serialize()),
        (COL_PROBLEM_SOLVED, paper.problem_solved.clone()),
        (COL_KEY_FINDING, paper.key_finding.clone()),
        (COL_METHODOLOGY, paper.methodology.clone()),
        (COL_LIMITATION, paper.limitation.clone()),
        (COL_RATING, paper.rating.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{legacy_date_added, parse_date};
    use crate::storage::StoreError;

    #[test]
    fn test_encode_then_decode() {
        let mut paper = Paper::new("Spatial transcriptomics atlas", 2022);
        paper.author = "Chen X".into();
        paper.tags = parse_tag_string("Methodology, AI");
        paper.limitation = "Small cohort".into();
        let date = parse_date("2025-03-04 10:15").unwrap();

        let mut raw = RawRow::new();
        for (column, value) in encode_paper(&paper, &date) {
            raw.set(column, value);
        }
        assert_eq!(raw.get(COL_CATEGORY), Some("AI, Methodology"));

        let record = decode_row(1, RecordId(1), &raw).unwrap();
        paper.date_added = Some(date);
        assert_eq!(record.to_paper(), paper);
    }

    #[test]
    fn test_decode_legacy_row() {
        let mut raw = RawRow::new();
        raw.set(COL_TITLE, "Old paper");
        raw.set(COL_FIRST_AUTHOR, "Doe J");
        raw.set(COL_YEAR, "2019.0");
        raw.set(COL_CATEGORY, "Gene Therapy");

        let record = decode_row(4, RecordId(4), &raw).unwrap();
        assert_eq!(record.author, "Doe J");
        assert_eq!(record.year, 2019);
        assert_eq!(record.date_added, legacy_date_added());
        assert_eq!(record.limitation, "");
        assert_eq!(record.rating, DEFAULT_RATING);
    }

    #[test]
    fn test_decode_rejects_non_numeric_rating() {
        let mut raw = RawRow::new();
        raw.set(COL_TITLE, "Paper");
        raw.set(COL_YEAR, "2020");
        raw.set(COL_RATING, "great");

        let err = decode_row(2, RecordId(2), &raw).unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { column: COL_RATING, .. }));
    }

    #[test]
    fn test_decode_or_skip() {
        let mut raw = RawRow::new();
        raw.set(COL_TITLE, "No year");
        assert!(decode_or_skip(1, RecordId(1), &raw).is_none());

        raw.set(COL_YEAR, "2020");
        assert_eq!(decode_or_skip(1, RecordId(1), &raw).unwrap().year, 2020);
    }
}
