//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, QuizRulesError, SavedWordError, TransitionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Rules(#[from] QuizRulesError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("quiz sessions must run inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Errors emitted by `SavedWordsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SavedWordsServiceError {
    #[error(transparent)]
    Validation(#[from] SavedWordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode saved words: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("stored saved words are unreadable: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Bank(#[from] QuestionError),
}
