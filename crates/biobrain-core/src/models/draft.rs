use serde::Serialize;

use crate::error::{BioBrainError, Result};
use crate::models::{ExtractedMetadata, Paper};
use crate::tags::{merge, serialize, split_preset_and_custom};

/// Contents of the edit form between reruns.
///
/// Tags are held the way the form shows them: a selection out of the preset
/// list plus a free-text comma-separated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftRecord {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub selected_tags: Vec<String>,
    pub custom_tags: String,
    pub problem: String,
    pub finding: String,
    pub method: String,
    pub limitation: String,
    pub rating: i64,
}

impl DraftRecord {
    /// An empty form. The first preset entry is preselected.
    pub fn new<S: AsRef<str>>(default_year: i64, default_rating: i64, preset: &[S]) -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: default_year,
            selected_tags: preset
                .first()
                .map(|p| vec![p.as_ref().to_string()])
                .unwrap_or_default(),
            custom_tags: String::new(),
            problem: String::new(),
            finding: String::new(),
            method: String::new(),
            limitation: String::new(),
            rating: default_rating,
        }
    }

    /// The form tags as they would be persisted.
    pub fn merged_tags(&self) -> Vec<String> {
        merge(&self.selected_tags, &self.custom_tags)
    }

    /// Validates the form and builds the paper to append.
    pub fn into_paper(self) -> Result<Paper> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(BioBrainError::ValidationError("title must not be empty".to_string()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(BioBrainError::ValidationError(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }

        let tags = self.merged_tags().into_iter().collect();
        Ok(Paper {
            date_added: None,
            title,
            author: self.author.trim().to_string(),
            year: self.year,
            tags,
            problem_solved: self.problem,
            key_finding: self.finding,
            methodology: self.method,
            limitation: self.limitation,
            rating: self.rating,
        })
    }
}

/// Applies an extraction result to a draft.
///
/// Fields present in `extracted` replace the draft's; absent ones are kept.
/// Suggested tags are split against `preset` so that suggestions outside the
/// preset list survive in the free-text field.
pub fn reconcile<S: AsRef<str>>(
    draft: &DraftRecord,
    extracted: &ExtractedMetadata,
    preset: &[S],
) -> DraftRecord {
    let pick = |new: &Option<String>, old: &String| new.clone().unwrap_or_else(|| old.clone());

    let (selected_tags, custom_tags) = match extracted.suggested_tags() {
        Some(raw) => {
            let (selected, custom) = split_preset_and_custom(raw, preset);
            (selected, serialize(&custom))
        }
        None => (draft.selected_tags.clone(), draft.custom_tags.clone()),
    };

    DraftRecord {
        title: pick(&extracted.title, &draft.title),
        author: pick(&extracted.author, &draft.author),
        year: extracted.year.unwrap_or(draft.year),
        selected_tags,
        custom_tags,
        problem: pick(&extracted.problem, &draft.problem),
        finding: pick(&extracted.finding, &draft.finding),
        method: pick(&extracted.method, &draft.method),
        limitation: pick(&extracted.limitation, &draft.limitation),
        rating: draft.rating,
    }
}
