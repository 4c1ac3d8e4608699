use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{CollectionId, ParseIdError, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has no blank to fill")]
    NoBlanks { id: QuestionId },

    #[error("question {id} has an empty blank")]
    EmptyBlank { id: QuestionId },

    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id} repeats option {option:?}")]
    DuplicateOption { id: QuestionId, option: String },

    #[error("question {id}: correct option {correct} is out of range (options: {len})")]
    CorrectOutOfRange {
        id: QuestionId,
        correct: usize,
        len: usize,
    },

    #[error("question {id} has no expected answer")]
    EmptyAnswer { id: QuestionId },

    #[error("collection {collection} has no questions")]
    EmptyCollection { collection: CollectionId },

    #[error("collection {collection} repeats question id {id}")]
    DuplicateId {
        collection: CollectionId,
        id: QuestionId,
    },

    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}

//
// ─── PROMPT PARTS ──────────────────────────────────────────────────────────────
//

/// One fragment of a question prompt.
///
/// For blanks, `text` is the expected answer. It is kept here and hidden from
/// the learner through [`Question::masked_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPart {
    pub text: String,
    pub is_blank: bool,
}

impl PromptPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_blank: false,
        }
    }

    #[must_use]
    pub fn blank(expected: impl Into<String>) -> Self {
        Self {
            text: expected.into(),
            is_blank: true,
        }
    }
}

/// Learner-facing view of a prompt part; blanks carry no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskedPart<'a> {
    Text(&'a str),
    Blank { position: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    FillInBlank,
    ImageMultipleChoice,
    OpenEnded,
}

/// Immutable quiz question. One variant per question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Sentence with one or more blanks, filled from `options`.
    FillInBlank {
        id: QuestionId,
        parts: Vec<PromptPart>,
        options: Vec<String>,
    },
    /// Pick the option (an image label) matching the prompt.
    ImageMultipleChoice {
        id: QuestionId,
        prompt: String,
        image: Option<String>,
        options: Vec<String>,
        correct: usize,
    },
    /// Free text answer, compared after normalization.
    OpenEnded {
        id: QuestionId,
        prompt: Vec<PromptPart>,
        answer: String,
        alternates: Vec<String>,
    },
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        match self {
            Question::FillInBlank { id, .. }
            | Question::ImageMultipleChoice { id, .. }
            | Question::OpenEnded { id, .. } => id,
        }
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::FillInBlank { .. } => QuestionType::FillInBlank,
            Question::ImageMultipleChoice { .. } => QuestionType::ImageMultipleChoice,
            Question::OpenEnded { .. } => QuestionType::OpenEnded,
        }
    }

    /// Candidate answers; empty for open-ended questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            Question::FillInBlank { options, .. }
            | Question::ImageMultipleChoice { options, .. } => options,
            Question::OpenEnded { .. } => &[],
        }
    }

    /// Prompt with every blank's expected text removed.
    #[must_use]
    pub fn masked_parts(&self) -> Vec<MaskedPart<'_>> {
        match self {
            Question::FillInBlank { parts, .. } | Question::OpenEnded { prompt: parts, .. } => {
                parts
                    .iter()
                    .enumerate()
                    .map(|(position, part)| {
                        if part.is_blank {
                            MaskedPart::Blank { position }
                        } else {
                            MaskedPart::Text(&part.text)
                        }
                    })
                    .collect()
            }
            Question::ImageMultipleChoice { prompt, .. } => vec![MaskedPart::Text(prompt)],
        }
    }

    /// Positions of the parts the learner has to fill.
    #[must_use]
    pub fn blank_positions(&self) -> Vec<usize> {
        match self {
            Question::FillInBlank { parts, .. } => parts
                .iter()
                .enumerate()
                .filter(|(_, part)| part.is_blank)
                .map(|(position, _)| position)
                .collect(),
            Question::ImageMultipleChoice { .. } | Question::OpenEnded { .. } => Vec::new(),
        }
    }

    /// Check the structural invariants of the variant.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), QuestionError> {
        match self {
            Question::FillInBlank { id, parts, options } => {
                let mut blanks = parts.iter().filter(|part| part.is_blank).peekable();
                if blanks.peek().is_none() {
                    return Err(QuestionError::NoBlanks { id: id.clone() });
                }
                if blanks.any(|part| part.text.trim().is_empty()) {
                    return Err(QuestionError::EmptyBlank { id: id.clone() });
                }
                if options.is_empty() {
                    return Err(QuestionError::NoOptions { id: id.clone() });
                }
                distinct_options(id, options)
            }
            Question::ImageMultipleChoice {
                id,
                options,
                correct,
                ..
            } => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions { id: id.clone() });
                }
                if *correct >= options.len() {
                    return Err(QuestionError::CorrectOutOfRange {
                        id: id.clone(),
                        correct: *correct,
                        len: options.len(),
                    });
                }
                distinct_options(id, options)
            }
            Question::OpenEnded { id, answer, .. } => {
                if answer.trim().is_empty() {
                    return Err(QuestionError::EmptyAnswer { id: id.clone() });
                }
                Ok(())
            }
        }
    }
}

/// Options are compared the way choices are matched: trimmed.
fn distinct_options(id: &QuestionId, options: &[String]) -> Result<(), QuestionError> {
    let mut seen = HashSet::with_capacity(options.len());
    for option in options {
        if !seen.insert(option.trim()) {
            return Err(QuestionError::DuplicateOption {
                id: id.clone(),
                option: option.trim().to_string(),
            });
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
