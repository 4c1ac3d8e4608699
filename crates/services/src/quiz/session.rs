use std::fmt;
use std::sync::Arc;

use quiz_core::evaluator::{Response, evaluate};
use quiz_core::model::{
    CollectionId, Question, QuizAction, QuizEvent, QuizPhase, QuizRules, QuizState, Transition,
    TransitionError,
};
use tokio::runtime::Handle;
use tracing::instrument;

use super::writer::ProgressWriter;
use crate::completion::CompletionRegistry;
use crate::error::QuizError;
use crate::progress::ProgressGateway;

/// One quiz attempt over a collection.
///
/// Created in `Loading`; [`QuizSession::start`] rehydrates the stored progress
/// and must finish before any answer is accepted. Every transition that
/// changes progress dispatches a single background write of the full
/// `(index, lives)` pair. The in-memory state is authoritative for the UI.
pub struct QuizSession {
    collection: CollectionId,
    questions: Arc<[Question]>,
    rules: QuizRules,
    state: QuizState,
    gateway: ProgressGateway,
    writer: Option<ProgressWriter>,
}

impl QuizSession {
    /// # Errors
    ///
    /// Returns `QuizError::Rules` if `questions` is empty or `max_lives` is 0.
    pub fn new(
        collection: CollectionId,
        questions: Arc<[Question]>,
        max_lives: u32,
        gateway: ProgressGateway,
    ) -> Result<Self, QuizError> {
        let rules = QuizRules::new(max_lives, questions.len())?;
        Ok(Self {
            collection,
            questions,
            rules,
            state: QuizState::Loading,
            gateway,
            writer: None,
        })
    }

    #[must_use]
    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    #[must_use]
    pub fn rules(&self) -> QuizRules {
        self.rules
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    /// Current index and question count, for the progress bar.
    #[must_use]
    pub fn progress(&self) -> (u32, u32) {
        let index = self
            .state
            .progress()
            .map_or(0, |progress| progress.current_question_index);
        (index, self.rules.question_count())
    }

    /// Header text, e.g. `2 / 5`.
    #[must_use]
    pub fn progress_label(&self) -> String {
        let (index, total) = self.progress();
        format!("{index} / {total}")
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.state
            .progress()
            .map_or(self.rules.max_lives(), |progress| progress.lives_remaining)
    }

    /// The question awaiting an answer; `None` unless the session is active.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::Active(progress) => usize::try_from(progress.current_question_index)
                .ok()
                .and_then(|index| self.questions.get(index)),
            QuizState::Loading | QuizState::Won(_) | QuizState::Exhausted(_) => None,
        }
    }

    /// Rehydrate stored progress and leave `Loading`.
    ///
    /// Storage problems never fail the start; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` if the session was already started and
    /// `QuizError::NoRuntime` outside a tokio runtime.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn start(&mut self) -> Result<Vec<QuizEvent>, QuizError> {
        if !matches!(self.state, QuizState::Loading) {
            return Err(TransitionError::Invalid {
                phase: self.phase(),
                action: QuizAction::Start,
            }
            .into());
        }
        let runtime = Handle::try_current()?;
        let stored = self.gateway.load().await;
        let transition = self.state.loaded(
            self.rules,
            stored.current_question_index,
            stored.lives_remaining,
        )?;
        self.writer = Some(ProgressWriter::new(self.gateway.clone(), runtime));
        tracing::debug!(?transition.state, "quiz session started");
        Ok(self.apply(transition))
    }

    /// Move to the next question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` unless the session is active.
    pub fn on_correct(&mut self) -> Result<Vec<QuizEvent>, QuizError> {
        let transition = self.state.on_correct(self.rules)?;
        Ok(self.apply(transition))
    }

    /// Take a life, or exhaust the run on the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` unless the session is active.
    pub fn on_wrong(&mut self) -> Result<Vec<QuizEvent>, QuizError> {
        let transition = self.state.on_wrong()?;
        Ok(self.apply(transition))
    }

    /// Back to the first question with full lives.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` before [`QuizSession::start`].
    pub fn restart(&mut self) -> Result<Vec<QuizEvent>, QuizError> {
        let transition = self.state.restart(self.rules)?;
        Ok(self.apply(transition))
    }

    /// Judge a response to the current question and apply the verdict.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` unless the session is active.
    pub fn answer(&mut self, response: &Response) -> Result<Vec<QuizEvent>, QuizError> {
        let Some(question) = self.current_question() else {
            return Err(TransitionError::Invalid {
                phase: self.phase(),
                action: QuizAction::Correct,
            }
            .into());
        };
        let verdict = evaluate(question, response);
        tracing::debug!(question = %question.id(), ?verdict, "answer evaluated");

        let mut events = vec![QuizEvent::AnswerResult(verdict)];
        let transition = if verdict.is_correct() {
            self.on_correct()?
        } else {
            self.on_wrong()?
        };
        events.extend(transition);
        Ok(events)
    }

    /// Mark a won quiz as completed and rewind progress for the next visit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` unless the session is won.
    #[instrument(skip(self, completions), fields(collection = %self.collection))]
    pub async fn complete(
        &mut self,
        completions: &CompletionRegistry,
    ) -> Result<Vec<QuizEvent>, QuizError> {
        let transition = self.state.complete(self.rules)?;
        let marked = completions.mark_quiz_complete(self.collection.clone()).await;
        let mut events = vec![marked];
        events.extend(self.apply(transition));
        Ok(events)
    }

    /// Wait until every dispatched progress write has landed.
    pub async fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().await;
        }
    }

    fn apply(&mut self, transition: Transition) -> Vec<QuizEvent> {
        let Transition {
            state,
            mut events,
            persist,
        } = transition;
        self.state = state;
        if let (Some(progress), Some(writer)) = (persist, self.writer.as_mut()) {
            writer.dispatch(progress);
        }
        events.extend(self.gateway.notice().take());
        events
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("collection", &self.collection)
            .field("questions_len", &self.questions.len())
            .field("rules", &self.rules)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLatch;
    use quiz_core::evaluator::Verdict;
    use quiz_core::model::{PromptPart, QuestionId};
    use storage::keys;
    use storage::repository::{InMemoryStore, KeyValueStore};

    fn questions(count: usize) -> Arc<[Question]> {
        (0..count)
            .map(|i| Question::ImageMultipleChoice {
                id: QuestionId::new(format!("q{i}")).unwrap(),
                prompt: "Морин".into(),
                image: None,
                options: vec!["A".into(), "B".into()],
                correct: 1,
            })
            .collect()
    }

    fn session(store: &InMemoryStore, count: usize) -> QuizSession {
        let gateway = ProgressGateway::new(Arc::new(store.clone()), NoticeLatch::new());
        QuizSession::new(
            CollectionId::new("animals").unwrap(),
            questions(count),
            5,
            gateway,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn answers_are_rejected_before_start() {
        let store = InMemoryStore::new();
        let mut quiz = session(&store, 3);
        assert!(matches!(quiz.on_correct(), Err(QuizError::Transition(_))));
        assert!(matches!(quiz.restart(), Err(QuizError::Transition(_))));
        assert!(quiz.answer(&Response::ChoiceIndex(1)).is_err());
        assert_eq!(store.get(keys::LIVES).await.unwrap(), None);
    }

    #[tokio::test]
    async fn start_twice_is_invalid() {
        let store = InMemoryStore::new();
        let mut quiz = session(&store, 3);
        quiz.start().await.unwrap();
        assert!(matches!(quiz.start().await, Err(QuizError::Transition(_))));
    }

    #[tokio::test]
    async fn answer_wrong_choice_costs_a_life() {
        let store = InMemoryStore::new();
        let mut quiz = session(&store, 3);
        quiz.start().await.unwrap();

        let events = quiz.answer(&Response::Choice("A".into())).unwrap();
        assert_eq!(
            events,
            vec![
                QuizEvent::AnswerResult(Verdict::Incorrect),
                QuizEvent::LivesChanged(4)
            ]
        );
        assert_eq!(quiz.lives(), 4);

        quiz.flush().await;
        assert_eq!(store.get(keys::LIVES).await.unwrap().as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn answer_right_choice_advances() {
        let store = InMemoryStore::new();
        let mut quiz = session(&store, 2);
        quiz.start().await.unwrap();

        let events = quiz.answer(&Response::ChoiceIndex(1)).unwrap();
        assert_eq!(events[0], QuizEvent::AnswerResult(Verdict::Correct));
        assert_eq!(quiz.progress(), (1, 2));
        assert_eq!(quiz.progress_label(), "1 / 2");
        assert!(quiz.current_question().is_some());
    }

    #[tokio::test]
    async fn masked_fill_in_blank_is_answerable_by_position() {
        let store = InMemoryStore::new();
        let gateway = ProgressGateway::new(Arc::new(store.clone()), NoticeLatch::new());
        let question = Question::FillInBlank {
            id: QuestionId::new("fib").unwrap(),
            parts: vec![PromptPart::text("Минии"), PromptPart::blank("эжы")],
            options: vec!["эжы".into(), "аба".into()],
        };
        let mut quiz = QuizSession::new(
            CollectionId::new("family").unwrap(),
            Arc::from(vec![question]),
            5,
            gateway,
        )
        .unwrap();
        quiz.start().await.unwrap();

        let blank = quiz.current_question().unwrap().blank_positions()[0];
        let events = quiz.answer(&Response::blank(blank, "Эжы")).unwrap();
        assert!(events.contains(&QuizEvent::SessionWon));
        assert_eq!(quiz.phase(), QuizPhase::Won);
        assert!(quiz.current_question().is_none());
    }
}
