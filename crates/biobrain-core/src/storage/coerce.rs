//! Typed reads of loosely typed stored values.
//!
//! Worksheets hand back everything as text (`"2021"`, `"2021.0"`, `""`) and
//! SQLite columns carry whatever an older version wrote. Integers are coerced
//! when the value is unambiguous and rejected otherwise.

use chrono::NaiveDateTime;

use super::error::{StoreError, StoreResult};
use crate::models::{legacy_date_added, parse_date};

/// Parses an integer, accepting an integral float such as `"2021.0"`.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    value.parse::<f64>().ok().and_then(integral_float)
}

/// An integral float inside the `i64` range. Anything else, including
/// values that would saturate on a cast, is `None`.
pub fn integral_float(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Reads an integer column. Empty or absent values fall back to `default`
/// when there is one; anything non-numeric is rejected.
pub fn coerce_int(
    row: usize,
    column: &'static str,
    raw: Option<&str>,
    default: Option<i64>,
) -> StoreResult<i64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_int(value).ok_or_else(|| StoreError::InvalidValue {
            row,
            column,
            value: value.to_string(),
        }),
        None => default.ok_or(StoreError::MissingValue { row, column }),
    }
}

/// Reads `date_added`, substituting the legacy sentinel for rows that have
/// none or carry something unparseable.
pub fn coerce_date(row: usize, raw: Option<&str>) -> NaiveDateTime {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => legacy_date_added(),
        Some(value) => parse_date(value).unwrap_or_else(|| {
            tracing::warn!(row, value, "unparseable date_added, using legacy sentinel");
            legacy_date_added()
        }),
    }
}
