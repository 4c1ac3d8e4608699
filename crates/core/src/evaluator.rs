//! Judges a learner response against a question.
//!
//! Dispatch is an exhaustive `match` over [`Question`]; a response whose shape
//! does not fit the question type is simply `Incorrect`.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::Question;

/// Outcome of evaluating a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }

    fn from_bool(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

/// What the learner submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Text per blank, keyed by prompt part position.
    Blanks(BTreeMap<usize, String>),
    /// The selected option, by its text.
    Choice(String),
    /// The selected option, by its position in `options`.
    ChoiceIndex(usize),
    /// Free text.
    Text(String),
}

impl Response {
    /// Convenience for the common single-blank case.
    #[must_use]
    pub fn blank(position: usize, text: impl Into<String>) -> Self {
        Response::Blanks(BTreeMap::from([(position, text.into())]))
    }
}

/// Evaluate `response` against `question`.
#[must_use]
pub fn evaluate(question: &Question, response: &Response) -> Verdict {
    let correct = match question {
        Question::FillInBlank { parts, .. } => match response {
            Response::Blanks(filled) => blanks_match(parts, filled),
            Response::Choice(_) | Response::ChoiceIndex(_) | Response::Text(_) => false,
        },
        Question::ImageMultipleChoice {
            options, correct, ..
        } => match response {
            Response::Choice(selected) => options
                .get(*correct)
                .is_some_and(|expected| expected.trim() == selected.trim()),
            Response::ChoiceIndex(index) => *index == *correct && *index < options.len(),
            Response::Blanks(_) | Response::Text(_) => false,
        },
        Question::OpenEnded {
            answer, alternates, ..
        } => match response {
            Response::Text(text) => {
                let submitted = normalize(text);
                !submitted.is_empty()
                    && std::iter::once(answer)
                        .chain(alternates)
                        .any(|accepted| normalize(accepted) == submitted)
            }
            Response::Blanks(_) | Response::Choice(_) | Response::ChoiceIndex(_) => false,
        },
    };
    Verdict::from_bool(correct)
}

fn blanks_match(parts: &[crate::model::PromptPart], filled: &BTreeMap<usize, String>) -> bool {
    let mut expected = 0_usize;
    for (position, part) in parts.iter().enumerate() {
        if !part.is_blank {
            continue;
        }
        expected += 1;
        match filled.get(&position) {
            Some(text) if same_ignoring_case(text, &part.text) => {}
            _ => return false,
        }
    }
    // extra entries point at non-blank parts
    expected > 0 && filled.len() == expected
}

fn same_ignoring_case(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Normalize free text for comparison.
///
/// Trims, collapses whitespace, lowercases, strips combining marks and folds
/// the Buryat letters `ү`, `ө`, `һ` onto `у`, `о`, `х`.
#[must_use]
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(fold_letter)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_letter(c: char) -> char {
    match c {
        'ү' => 'у',
        'ө' => 'о',
        'һ' => 'х',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PromptPart, QuestionId};

    fn fill_in_blank(expected: &str) -> Question {
        Question::FillInBlank {
            id: QuestionId::new("fib").unwrap(),
            parts: vec![
                PromptPart::text("Энэ"),
                PromptPart::blank(expected),
                PromptPart::text("."),
            ],
            options: vec![expected.to_string(), "морин".to_string()],
        }
    }

    fn multiple_choice() -> Question {
        Question::ImageMultipleChoice {
            id: QuestionId::new("imc").unwrap(),
            prompt: "Морин".into(),
            image: None,
            options: vec!["A".into(), "B".into(), "C".into()],
            correct: 1,
        }
    }

    fn open_ended() -> Question {
        Question::OpenEnded {
            id: QuestionId::new("oe").unwrap(),
            prompt: vec![PromptPart::text("Переведите: корова")],
            answer: "үхэр".into(),
            alternates: vec!["үнеэн".into()],
        }
    }

    #[test]
    fn fill_in_blank_ignores_case_and_padding() {
        let question = fill_in_blank("һаба");
        let verdict = evaluate(&question, &Response::blank(1, " ҺАБА "));
        assert_eq!(verdict, Verdict::Correct);
    }

    #[test]
    fn fill_in_blank_missing_or_extra_positions_are_incorrect() {
        let question = fill_in_blank("һаба");
        assert_eq!(
            evaluate(&question, &Response::Blanks(BTreeMap::new())),
            Verdict::Incorrect
        );
        assert_eq!(
            evaluate(&question, &Response::blank(0, "һаба")),
            Verdict::Incorrect
        );

        let extra = Response::Blanks(BTreeMap::from([
            (1, "һаба".to_string()),
            (2, ".".to_string()),
        ]));
        assert_eq!(evaluate(&question, &extra), Verdict::Incorrect);
    }

    #[test]
    fn fill_in_blank_does_not_fold_letters() {
        let question = fill_in_blank("һаба");
        assert_eq!(
            evaluate(&question, &Response::blank(1, "хаба")),
            Verdict::Incorrect
        );
    }

    #[test]
    fn multiple_choice_wrong_option_is_incorrect() {
        let question = multiple_choice();
        assert_eq!(
            evaluate(&question, &Response::Choice("A".into())),
            Verdict::Incorrect
        );
        assert_eq!(
            evaluate(&question, &Response::Choice("B".into())),
            Verdict::Correct
        );
        assert_eq!(
            evaluate(&question, &Response::ChoiceIndex(1)),
            Verdict::Correct
        );
        assert_eq!(
            evaluate(&question, &Response::ChoiceIndex(7)),
            Verdict::Incorrect
        );
    }

    #[test]
    fn open_ended_accepts_folded_letters_and_alternates() {
        let question = open_ended();
        for answer in ["үхэр", "  ҮХЭР ", "ухэр", "Үнеэн"] {
            assert_eq!(
                evaluate(&question, &Response::Text(answer.into())),
                Verdict::Correct,
                "{answer}"
            );
        }
        assert_eq!(
            evaluate(&question, &Response::Text("морин".into())),
            Verdict::Incorrect
        );
        assert_eq!(
            evaluate(&question, &Response::Text("   ".into())),
            Verdict::Incorrect
        );
    }

    #[test]
    fn mismatched_response_shape_is_incorrect() {
        assert_eq!(
            evaluate(&open_ended(), &Response::ChoiceIndex(0)),
            Verdict::Incorrect
        );
        assert_eq!(
            evaluate(&multiple_choice(), &Response::Text("B".into())),
            Verdict::Incorrect
        );
        assert_eq!(
            evaluate(&fill_in_blank("аба"), &Response::Text("аба".into())),
            Verdict::Incorrect
        );
    }

    #[test]
    fn normalize_strips_marks_and_whitespace() {
        assert_eq!(normalize("  Ёлка   зелёная "), "елка зеленая");
        assert_eq!(normalize("ӨГЛӨӨ"), "оглоо");
    }
}
