use std::fmt;

use thiserror::Error;

use crate::model::event::QuizEvent;

/// Lives granted at the start of every run.
pub const DEFAULT_MAX_LIVES: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizRulesError {
    #[error("max lives must be > 0")]
    InvalidMaxLives,

    #[error("a quiz needs at least one question")]
    NoQuestions,

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("cannot {action} while the quiz is {phase}")]
    Invalid { phase: QuizPhase, action: QuizAction },
}

//
// ─── RULES & PROGRESS ──────────────────────────────────────────────────────────
//

/// Fixed parameters of one quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRules {
    max_lives: u32,
    question_count: u32,
}

impl QuizRules {
    /// # Errors
    ///
    /// Returns `QuizRulesError` if `max_lives` is zero or there are no questions.
    pub fn new(max_lives: u32, question_count: usize) -> Result<Self, QuizRulesError> {
        if max_lives == 0 {
            return Err(QuizRulesError::InvalidMaxLives);
        }
        if question_count == 0 {
            return Err(QuizRulesError::NoQuestions);
        }
        let question_count = u32::try_from(question_count)
            .map_err(|_| QuizRulesError::TooManyQuestions { len: question_count })?;
        Ok(Self {
            max_lives,
            question_count,
        })
    }

    #[must_use]
    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}

/// The two scalars that survive an app restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuizProgress {
    pub current_question_index: u32,
    pub lives_remaining: u32,
}

impl QuizProgress {
    #[must_use]
    pub fn fresh(rules: QuizRules) -> Self {
        Self {
            current_question_index: 0,
            lives_remaining: rules.max_lives,
        }
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    Loading,
    Active,
    Won,
    Exhausted,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuizPhase::Loading => "loading",
            QuizPhase::Active => "active",
            QuizPhase::Won => "won",
            QuizPhase::Exhausted => "out of lives",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizAction {
    Start,
    Correct,
    Wrong,
    Restart,
    Complete,
}

impl fmt::Display for QuizAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuizAction::Start => "start",
            QuizAction::Correct => "accept a correct answer",
            QuizAction::Wrong => "accept a wrong answer",
            QuizAction::Restart => "restart",
            QuizAction::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Quiz run state.
///
/// `Exhausted` holds `lives_remaining == 0` in memory; storage keeps the last
/// positive count (see [`QuizState::on_wrong`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizState {
    #[default]
    Loading,
    Active(QuizProgress),
    Won(QuizProgress),
    Exhausted(QuizProgress),
}

/// Result of a transition: the new state, the signals for the UI and the
/// progress to write, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: QuizState,
    pub events: Vec<QuizEvent>,
    pub persist: Option<QuizProgress>,
}

impl QuizState {
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self {
            QuizState::Loading => QuizPhase::Loading,
            QuizState::Active(_) => QuizPhase::Active,
            QuizState::Won(_) => QuizPhase::Won,
            QuizState::Exhausted(_) => QuizPhase::Exhausted,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<QuizProgress> {
        match self {
            QuizState::Loading => None,
            QuizState::Active(progress)
            | QuizState::Won(progress)
            | QuizState::Exhausted(progress) => Some(*progress),
        }
    }

    fn invalid(&self, action: QuizAction) -> TransitionError {
        TransitionError::Invalid {
            phase: self.phase(),
            action,
        }
    }

    /// Leave `Loading` with the rehydrated values.
    ///
    /// Missing or out-of-range values fall back to defaults: an index past the
    /// question count restarts at 0, lives of 0 or above the maximum become
    /// the maximum. A stored index equal to the count resumes as `Won`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` unless the state is `Loading`.
    pub fn loaded(
        &self,
        rules: QuizRules,
        index: Option<u32>,
        lives: Option<u32>,
    ) -> Result<Transition, TransitionError> {
        if !matches!(self, QuizState::Loading) {
            return Err(self.invalid(QuizAction::Start));
        }
        let progress = QuizProgress {
            current_question_index: index
                .filter(|index| *index <= rules.question_count)
                .unwrap_or(0),
            lives_remaining: lives
                .filter(|lives| (1..=rules.max_lives).contains(lives))
                .unwrap_or(rules.max_lives),
        };

        let mut events = vec![
            QuizEvent::ProgressChanged {
                index: progress.current_question_index,
                total: rules.question_count,
            },
            QuizEvent::LivesChanged(progress.lives_remaining),
        ];
        let state = if progress.current_question_index == rules.question_count {
            events.push(QuizEvent::SessionWon);
            QuizState::Won(progress)
        } else {
            QuizState::Active(progress)
        };

        Ok(Transition {
            state,
            events,
            persist: None,
        })
    }

    /// Advance to the next question; `Won` after the last one.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` unless the state is `Active`.
    pub fn on_correct(&self, rules: QuizRules) -> Result<Transition, TransitionError> {
        let QuizState::Active(progress) = self else {
            return Err(self.invalid(QuizAction::Correct));
        };
        let next = QuizProgress {
            current_question_index: (progress.current_question_index + 1)
                .min(rules.question_count),
            ..*progress
        };

        let mut events = vec![QuizEvent::ProgressChanged {
            index: next.current_question_index,
            total: rules.question_count,
        }];
        let state = if next.current_question_index == rules.question_count {
            events.push(QuizEvent::SessionWon);
            QuizState::Won(next)
        } else {
            QuizState::Active(next)
        };

        Ok(Transition {
            state,
            events,
            persist: Some(next),
        })
    }

    /// Take a life, or end the run when the last one is lost.
    ///
    /// On the last life the in-memory count drops to 0 and the run is
    /// `Exhausted`, while the persisted payload keeps the last positive count.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` unless the state is `Active`.
    pub fn on_wrong(&self) -> Result<Transition, TransitionError> {
        let QuizState::Active(progress) = self else {
            return Err(self.invalid(QuizAction::Wrong));
        };

        if progress.lives_remaining > 1 {
            let next = QuizProgress {
                lives_remaining: progress.lives_remaining - 1,
                ..*progress
            };
            return Ok(Transition {
                state: QuizState::Active(next),
                events: vec![QuizEvent::LivesChanged(next.lives_remaining)],
                persist: Some(next),
            });
        }

        let exhausted = QuizProgress {
            lives_remaining: 0,
            ..*progress
        };
        Ok(Transition {
            state: QuizState::Exhausted(exhausted),
            events: vec![QuizEvent::LivesChanged(0), QuizEvent::SessionExhausted],
            persist: Some(*progress),
        })
    }

    /// Reset to the first question with full lives.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` while still `Loading`.
    pub fn restart(&self, rules: QuizRules) -> Result<Transition, TransitionError> {
        if matches!(self, QuizState::Loading) {
            return Err(self.invalid(QuizAction::Restart));
        }
        Ok(Self::reset(rules))
    }

    /// Leave a won run; progress is rewound so the next visit starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Invalid` unless the state is `Won`.
    pub fn complete(&self, rules: QuizRules) -> Result<Transition, TransitionError> {
        if !matches!(self, QuizState::Won(_)) {
            return Err(self.invalid(QuizAction::Complete));
        }
        Ok(Self::reset(rules))
    }

    fn reset(rules: QuizRules) -> Transition {
        let fresh = QuizProgress::fresh(rules);
        Transition {
            state: QuizState::Active(fresh),
            events: vec![
                QuizEvent::ProgressChanged {
                    index: 0,
                    total: rules.question_count,
                },
                QuizEvent::LivesChanged(fresh.lives_remaining),
            ],
            persist: Some(fresh),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(questions: usize) -> QuizRules {
        QuizRules::new(DEFAULT_MAX_LIVES, questions).unwrap()
    }

    fn active(index: u32, lives: u32) -> QuizState {
        QuizState::Active(QuizProgress {
            current_question_index: index,
            lives_remaining: lives,
        })
    }

    fn assert_bounds(state: &QuizState, rules: QuizRules) {
        if let Some(progress) = state.progress() {
            assert!(progress.current_question_index <= rules.question_count());
            assert!(progress.lives_remaining <= rules.max_lives());
        }
    }

    #[test]
    fn rules_reject_zero_lives_and_empty_quiz() {
        assert_eq!(QuizRules::new(0, 3), Err(QuizRulesError::InvalidMaxLives));
        assert_eq!(QuizRules::new(5, 0), Err(QuizRulesError::NoQuestions));
    }

    #[test]
    fn loaded_defaults_missing_values() {
        let rules = rules(3);
        let transition = QuizState::Loading.loaded(rules, None, None).unwrap();
        assert_eq!(transition.state, active(0, 5));
        assert_eq!(transition.persist, None);
    }

    #[test]
    fn loaded_discards_out_of_range_values() {
        let rules = rules(3);
        let transition = QuizState::Loading.loaded(rules, Some(9), Some(0)).unwrap();
        assert_eq!(transition.state, active(0, 5));

        let transition = QuizState::Loading.loaded(rules, Some(2), Some(17)).unwrap();
        assert_eq!(transition.state, active(2, 5));
    }

    #[test]
    fn loaded_at_question_count_resumes_won() {
        let rules = rules(3);
        let transition = QuizState::Loading.loaded(rules, Some(3), Some(2)).unwrap();
        assert!(matches!(transition.state, QuizState::Won(_)));
        assert!(transition.events.contains(&QuizEvent::SessionWon));
    }

    #[test]
    fn three_correct_answers_win_a_three_question_quiz() {
        let rules = rules(3);
        let mut state = QuizState::Loading.loaded(rules, None, None).unwrap().state;
        for _ in 0..3 {
            let transition = state.on_correct(rules).unwrap();
            state = transition.state;
            assert_bounds(&state, rules);
        }
        assert_eq!(state.phase(), QuizPhase::Won);
        assert_eq!(state.progress().unwrap().current_question_index, 3);
    }

    #[test]
    fn wrong_answer_takes_a_life() {
        let transition = active(1, 3).on_wrong().unwrap();
        assert_eq!(transition.state, active(1, 2));
        assert_eq!(transition.events, vec![QuizEvent::LivesChanged(2)]);
        assert_eq!(transition.persist.unwrap().lives_remaining, 2);
    }

    #[test]
    fn last_life_exhausts_and_persists_last_positive_count() {
        let transition = active(2, 1).on_wrong().unwrap();
        assert_eq!(transition.state.phase(), QuizPhase::Exhausted);
        assert_eq!(transition.state.progress().unwrap().lives_remaining, 0);
        assert!(transition.events.contains(&QuizEvent::SessionExhausted));
        assert_eq!(
            transition.persist,
            Some(QuizProgress {
                current_question_index: 2,
                lives_remaining: 1
            })
        );
    }

    #[test]
    fn answers_rejected_outside_active() {
        let rules = rules(3);
        let err = QuizState::Loading.on_correct(rules).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                phase: QuizPhase::Loading,
                action: QuizAction::Correct
            }
        );

        let exhausted = active(0, 1).on_wrong().unwrap().state;
        assert!(exhausted.on_correct(rules).is_err());
        assert!(exhausted.on_wrong().is_err());
        assert!(QuizState::Loading.restart(rules).is_err());
        assert!(active(0, 5).loaded(rules, None, None).is_err());
    }

    #[test]
    fn restart_resets_from_any_state() {
        let rules = rules(4);
        let won = QuizState::Won(QuizProgress {
            current_question_index: 4,
            lives_remaining: 2,
        });
        let exhausted = QuizState::Exhausted(QuizProgress {
            current_question_index: 1,
            lives_remaining: 0,
        });
        for state in [active(3, 1), won, exhausted] {
            let transition = state.restart(rules).unwrap();
            assert_eq!(transition.state, active(0, 5));
            assert_eq!(transition.persist, Some(QuizProgress::fresh(rules)));
        }
    }

    #[test]
    fn complete_only_from_won() {
        let rules = rules(2);
        assert!(active(1, 5).complete(rules).is_err());
        let won = active(1, 5).on_correct(rules).unwrap().state;
        let transition = won.complete(rules).unwrap();
        assert_eq!(transition.state, active(0, 5));
    }
}
