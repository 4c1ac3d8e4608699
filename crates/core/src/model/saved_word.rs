use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SavedWordId;

/// Input limit of the word and translation fields.
pub const MAX_SAVED_TEXT_CHARS: usize = 80;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SavedWordError {
    #[error("word cannot be empty")]
    EmptyWord,

    #[error("translation cannot be empty")]
    EmptyTranslation,

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Unvalidated input from the "add word" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedWordDraft {
    pub word: String,
    pub translation: String,
}

impl SavedWordDraft {
    #[must_use]
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `SavedWordError` if either field is empty after trimming or
    /// exceeds [`MAX_SAVED_TEXT_CHARS`].
    pub fn validate(
        self,
        id: SavedWordId,
        saved_at: DateTime<Utc>,
    ) -> Result<SavedWord, SavedWordError> {
        let word = checked(&self.word, "word", SavedWordError::EmptyWord)?;
        let translation = checked(
            &self.translation,
            "translation",
            SavedWordError::EmptyTranslation,
        )?;
        Ok(SavedWord {
            id,
            word,
            translation,
            saved_at,
        })
    }
}

fn checked(raw: &str, field: &'static str, empty: SavedWordError) -> Result<String, SavedWordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > MAX_SAVED_TEXT_CHARS {
        return Err(SavedWordError::TooLong {
            field,
            max: MAX_SAVED_TEXT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// A word the learner saved with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWord {
    pub id: SavedWordId,
    #[serde(alias = "text")]
    pub word: String,
    #[serde(alias = "translatedText")]
    pub translation: String,
    #[serde(rename = "dateTime")]
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn validate_trims_fields() {
        let id = SavedWordId::generate();
        let word = SavedWordDraft::new("  һайн ", " хорошо ")
            .validate(id, fixed_now())
            .unwrap();
        assert_eq!(word.word, "һайн");
        assert_eq!(word.translation, "хорошо");
        assert_eq!(word.id, id);
    }

    #[test]
    fn validate_rejects_empty_and_long_fields() {
        let id = SavedWordId::generate();
        assert_eq!(
            SavedWordDraft::new(" ", "x").validate(id, fixed_now()),
            Err(SavedWordError::EmptyWord)
        );
        assert_eq!(
            SavedWordDraft::new("x", "").validate(id, fixed_now()),
            Err(SavedWordError::EmptyTranslation)
        );
        let long = "ө".repeat(MAX_SAVED_TEXT_CHARS + 1);
        assert!(matches!(
            SavedWordDraft::new(long, "x").validate(id, fixed_now()),
            Err(SavedWordError::TooLong { field: "word", .. })
        ));
    }

    #[test]
    fn serializes_with_date_time_field() {
        let word = SavedWordDraft::new("аба", "папа")
            .validate(SavedWordId::generate(), fixed_now())
            .unwrap();
        let json = serde_json::to_value(&word).unwrap();
        assert!(json.get("dateTime").is_some());
        let back: SavedWord = serde_json::from_value(json).unwrap();
        assert_eq!(back, word);
    }

    #[test]
    fn reads_words_saved_by_the_previous_app() {
        let raw = r#"{
            "text": "морин",
            "translatedText": "лошадь",
            "id": "7d3f1c0e-4a52-4a8e-9a8e-1f6f0c7c2b11",
            "dateTime": "2023-11-14T22:13:20.000Z"
        }"#;
        let word: SavedWord = serde_json::from_str(raw).unwrap();
        assert_eq!(word.word, "морин");
        assert_eq!(word.translation, "лошадь");
        assert_eq!(word.saved_at, fixed_now());
    }
}
