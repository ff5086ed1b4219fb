use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::tags::TagsField;

/// Fields suggested by the metadata extractor. Every field is optional; a
/// missing one leaves the corresponding draft field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TagsField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsField>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub problem: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub finding: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub method: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub limitation: Option<String>,
}

impl ExtractedMetadata {
    /// Suggested tags, from `category` or else `tags`.
    pub fn suggested_tags(&self) -> Option<&TagsField> {
        self.category.as_ref().or(self.tags.as_ref())
    }
}

/// Strings pass through; numbers are printed; lists of strings are joined.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            Some(parts.join(", "))
        }
        _ => None,
    })
}

/// Integers, integral floats and numeric strings become a year; anything
/// else is dropped.
fn lenient_year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(crate::storage::coerce::integral_float)),
        Value::String(s) => crate::storage::coerce::parse_int(&s),
        _ => None,
    })
}
