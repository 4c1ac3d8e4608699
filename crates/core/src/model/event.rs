use crate::evaluator::Verdict;
use crate::model::completion::CompletionKind;
use crate::model::ids::CollectionId;

/// Signals emitted for presentation collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Progress header changed (`index / total`).
    ProgressChanged { index: u32, total: u32 },
    LivesChanged(u32),
    AnswerResult(Verdict),
    SessionWon,
    /// Out of lives; the only way forward is a restart.
    SessionExhausted,
    CollectionMarkedComplete {
        collection: CollectionId,
        kind: CompletionKind,
    },
    /// Storage could not be reached. Raised at most once per process.
    StorageUnavailable,
}
