mod completion;
mod event;
mod ids;
mod question;
mod quiz;
mod saved_word;

pub use completion::{CompletionKind, CompletionSet};
pub use event::QuizEvent;
pub use ids::{CollectionId, ParseIdError, QuestionId, SavedWordId};
pub use question::{MaskedPart, PromptPart, Question, QuestionError, QuestionType};
pub use quiz::{
    DEFAULT_MAX_LIVES, QuizAction, QuizPhase, QuizProgress, QuizRules, QuizRulesError, QuizState,
    Transition, TransitionError,
};
pub use saved_word::{MAX_SAVED_TEXT_CHARS, SavedWord, SavedWordDraft, SavedWordError};
