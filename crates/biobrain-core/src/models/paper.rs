use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};

use crate::tags::TagSet;

/// Timestamp format used for the `date_added` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `date_added` value synthesized for rows written before the column existed.
pub const LEGACY_DATE_ADDED: &str = "2024-01-01 00:00";

pub const DEFAULT_RATING: i64 = 4;

/// Store-assigned identifier. SQLite rowid or 1-based worksheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A paper ready to be appended. `date_added` is stamped by the store when
/// left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    #[serde(serialize_with = "serialize_opt_date")]
    pub date_added: Option<NaiveDateTime>,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub tags: TagSet,
    pub problem_solved: String,
    pub key_finding: String,
    pub methodology: String,
    pub limitation: String,
    pub rating: i64,
}

impl Paper {
    pub fn new(title: impl Into<String>, year: i64) -> Self {
        Self {
            date_added: None,
            title: title.into(),
            author: String::new(),
            year,
            tags: TagSet::new(),
            problem_solved: String::new(),
            key_finding: String::new(),
            methodology: String::new(),
            limitation: String::new(),
            rating: DEFAULT_RATING,
        }
    }
}

/// One stored entry of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    pub id: RecordId,
    #[serde(serialize_with = "serialize_date")]
    pub date_added: NaiveDateTime,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub tags: TagSet,
    pub problem_solved: String,
    pub key_finding: String,
    pub methodology: String,
    pub limitation: String,
    pub rating: i64,
}

impl PaperRecord {
    pub fn from_paper(id: RecordId, date_added: NaiveDateTime, paper: Paper) -> Self {
        Self {
            id,
            date_added,
            title: paper.title,
            author: paper.author,
            year: paper.year,
            tags: paper.tags,
            problem_solved: paper.problem_solved,
            key_finding: paper.key_finding,
            methodology: paper.methodology,
            limitation: paper.limitation,
            rating: paper.rating,
        }
    }

    /// The record's content without its id.
    pub fn to_paper(&self) -> Paper {
        Paper {
            date_added: Some(self.date_added),
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            tags: self.tags.clone(),
            problem_solved: self.problem_solved.clone(),
            key_finding: self.key_finding.clone(),
            methodology: self.methodology.clone(),
            limitation: self.limitation.clone(),
            rating: self.rating,
        }
    }

    /// The tag column exactly as persisted.
    pub fn tag_string(&self) -> String {
        self.tags.serialize()
    }
}

/// Current local time truncated to the minute, matching [`DATE_FORMAT`].
pub fn now_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn legacy_date_added() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Parses a stored `date_added` value.
///
/// Accepts the canonical minute format plus the shapes older rows carry:
/// seconds, a bare date, or RFC 3339.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in [DATE_FORMAT, "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_local())
}

fn serialize_date<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_date(date))
}

fn serialize_opt_date<S: Serializer>(
    date: &Option<NaiveDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.serialize_str(&format_date(d)),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_date("2025-06-01 14:30"), Some(expected));
        assert_eq!(parse_date("2025-06-01 14:30:00"), Some(expected));
        assert_eq!(parse_date(" 2025-06-01T14:30:00 "), Some(expected));
        assert_eq!(
            parse_date("2025-06-01"),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_legacy_sentinel_matches_string_form() {
        assert_eq!(format_date(&legacy_date_added()), LEGACY_DATE_ADDED);
        assert_eq!(parse_date(LEGACY_DATE_ADDED), Some(legacy_date_added()));
    }

    #[test]
    fn test_now_minute_has_no_seconds() {
        let now = now_minute();
        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }

    #[test]
    fn test_record_paper_roundtrip() {
        let mut paper = Paper::new("Base editing in vivo", 2024);
        paper.tags = crate::tags::parse_tag_string("Gene Therapy, AI");
        let date = legacy_date_added();
        let record = PaperRecord::from_paper(RecordId(7), date, paper.clone());
        assert_eq!(record.tag_string(), "AI, Gene Therapy");

        paper.date_added = Some(date);
        assert_eq!(record.to_paper(), paper);
    }

    #[test]
    fn test_record_serializes_date_in_column_format() {
        let record = PaperRecord::from_paper(
            RecordId(1),
            legacy_date_added(),
            Paper::new("Title", 2020),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date_added"], LEGACY_DATE_ADDED);
        assert_eq!(json["id"], 1);
        assert_eq!(json["rating"], 4);
    }
}
