//! Immutable question bank keyed by collection.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::model::{CollectionId, PromptPart, Question, QuestionError, QuestionId};

/// Ordered questions per collection. Validated once at construction.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    collections: BTreeMap<CollectionId, Arc<[Question]>>,
}

impl QuestionBank {
    /// Build a bank, validating every question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for an empty collection, a duplicated question
    /// id inside a collection, or a question violating its variant invariants.
    pub fn new(
        collections: impl IntoIterator<Item = (CollectionId, Vec<Question>)>,
    ) -> Result<Self, QuestionError> {
        let mut bank = BTreeMap::new();
        for (collection, questions) in collections {
            if questions.is_empty() {
                return Err(QuestionError::EmptyCollection { collection });
            }
            let mut seen = HashSet::with_capacity(questions.len());
            for question in &questions {
                question.validate()?;
                if !seen.insert(question.id()) {
                    return Err(QuestionError::DuplicateId {
                        collection,
                        id: question.id().clone(),
                    });
                }
            }
            bank.insert(collection, Arc::from(questions));
        }
        Ok(Self { collections: bank })
    }

    /// Questions of a collection, in presentation order.
    ///
    /// # Panics
    ///
    /// Panics if the collection is not part of the bank. The bank is static,
    /// so an unknown key is a programming error.
    #[must_use]
    pub fn questions_for(&self, collection: &CollectionId) -> &[Question] {
        self.shared(collection)
    }

    /// Same as [`QuestionBank::questions_for`], as a cheaply clonable handle.
    ///
    /// # Panics
    ///
    /// Panics if the collection is not part of the bank.
    #[must_use]
    pub fn shared(&self, collection: &CollectionId) -> &Arc<[Question]> {
        match self.collections.get(collection) {
            Some(questions) => questions,
            None => panic!("unknown quiz collection: {collection}"),
        }
    }

    /// Number of questions in a collection.
    ///
    /// # Panics
    ///
    /// Panics if the collection is not part of the bank.
    #[must_use]
    pub fn len(&self, collection: &CollectionId) -> usize {
        self.questions_for(collection).len()
    }

    #[must_use]
    pub fn contains(&self, collection: &CollectionId) -> bool {
        self.collections.contains_key(collection)
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionId> {
        self.collections.keys()
    }

    /// The bank shipped with the app.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the bundled data is inconsistent.
    pub fn builtin() -> Result<Self, QuestionError> {
        let animals = vec![
            fill_in_blank(
                "animals-1",
                &[("Минии", false), ("нохой", true), ("— моя собака", false)],
                &["нохой", "морин", "үхэр"],
            )?,
            Question::ImageMultipleChoice {
                id: QuestionId::new("animals-2")?,
                prompt: "Морин".into(),
                image: Some("horse".into()),
                options: strings(&["Собака", "Лошадь", "Корова"]),
                correct: 1,
            },
            Question::OpenEnded {
                id: QuestionId::new("animals-3")?,
                prompt: vec![PromptPart::text("Переведите: корова")],
                answer: "үхэр".into(),
                alternates: strings(&["үнеэн"]),
            },
        ];

        let family = vec![
            fill_in_blank(
                "family-1",
                &[("Минии", false), ("эжы", true), ("— моя мама", false)],
                &["эжы", "аба", "ахай"],
            )?,
            Question::ImageMultipleChoice {
                id: QuestionId::new("family-2")?,
                prompt: "Аба".into(),
                image: Some("father".into()),
                options: strings(&["Мама", "Папа", "Брат"]),
                correct: 1,
            },
            fill_in_blank(
                "family-3",
                &[("Энэ минии", false), ("һамган", true), ("— это моя жена", false)],
                &["һамган", "эгэшэ", "аба"],
            )?,
            Question::OpenEnded {
                id: QuestionId::new("family-4")?,
                prompt: vec![PromptPart::text("Переведите: старшая сестра")],
                answer: "эгэшэ".into(),
                alternates: Vec::new(),
            },
        ];

        Self::new([
            (CollectionId::new("animals")?, animals),
            (CollectionId::new("family")?, family),
        ])
    }
}

fn fill_in_blank(
    id: &str,
    parts: &[(&str, bool)],
    options: &[&str],
) -> Result<Question, QuestionError> {
    Ok(Question::FillInBlank {
        id: QuestionId::new(id)?,
        parts: parts
            .iter()
            .map(|(text, is_blank)| {
                if *is_blank {
                    PromptPart::blank(*text)
                } else {
                    PromptPart::text(*text)
                }
            })
            .collect(),
        options: strings(options),
    })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> CollectionId {
        CollectionId::new(raw).unwrap()
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.len(&key("animals")), 3);
        assert_eq!(bank.len(&key("family")), 4);
        assert!(!bank.contains(&key("colors")));
    }

    #[test]
    fn keeps_question_order() {
        let bank = QuestionBank::builtin().unwrap();
        let ids: Vec<_> = bank
            .questions_for(&key("animals"))
            .iter()
            .map(|q| q.id().as_str().to_string())
            .collect();
        assert_eq!(ids, ["animals-1", "animals-2", "animals-3"]);
    }

    #[test]
    #[should_panic(expected = "unknown quiz collection")]
    fn unknown_collection_panics() {
        let bank = QuestionBank::builtin().unwrap();
        let _ = bank.questions_for(&key("colors"));
    }

    #[test]
    fn rejects_duplicate_ids_and_empty_collections() {
        let question = fill_in_blank("q", &[("аба", true)], &["аба"]).unwrap();
        let err = QuestionBank::new([(key("a"), vec![question.clone(), question])]).unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateId { .. }));

        let err = QuestionBank::new([(key("b"), Vec::new())]).unwrap_err();
        assert!(matches!(err, QuestionError::EmptyCollection { .. }));
    }

    #[test]
    fn rejects_invalid_questions() {
        let broken = fill_in_blank("q", &[("аба", false)], &["аба"]).unwrap();
        let err = QuestionBank::new([(key("a"), vec![broken])]).unwrap_err();
        assert!(matches!(err, QuestionError::NoBlanks { .. }));
    }
}
