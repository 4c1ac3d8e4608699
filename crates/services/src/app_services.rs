use std::sync::Arc;

use quiz_core::bank::QuestionBank;
use quiz_core::model::{CollectionId, QuizEvent};
use storage::repository::Storage;

use crate::Clock;
use crate::completion::CompletionRegistry;
use crate::config::QuizConfig;
use crate::error::{AppServicesError, QuizError};
use crate::notice::NoticeLatch;
use crate::progress::ProgressGateway;
use crate::quiz::QuizSession;
use crate::saved_words::SavedWordsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: QuizConfig,
    bank: Arc<QuestionBank>,
    progress: ProgressGateway,
    completions: Arc<CompletionRegistry>,
    saved_words: Arc<SavedWordsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.database_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// bundled question bank is inconsistent.
    pub async fn new_sqlite(config: QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.database_url).await?;
        let bank = QuestionBank::builtin()?;
        Ok(Self::from_storage(storage, bank, config, clock).await)
    }

    /// Build services over a fresh in-memory store with the bundled bank.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Bank` if the bundled question bank is
    /// inconsistent.
    pub async fn in_memory(config: QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let bank = QuestionBank::builtin()?;
        Ok(Self::from_storage(Storage::in_memory(), bank, config, clock).await)
    }

    /// Wire services over existing storage and hydrate the completion sets.
    pub async fn from_storage(
        storage: Storage,
        bank: QuestionBank,
        config: QuizConfig,
        clock: Clock,
    ) -> Self {
        let notice = NoticeLatch::new();
        let progress = ProgressGateway::new(Arc::clone(&storage.kv), notice.clone());
        let completions = Arc::new(CompletionRegistry::new(Arc::clone(&storage.kv), notice));
        completions.hydrate().await;
        let saved_words = Arc::new(SavedWordsService::new(clock, Arc::clone(&storage.kv)));

        Self {
            config,
            bank: Arc::new(bank),
            progress,
            completions,
            saved_words,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn completions(&self) -> Arc<CompletionRegistry> {
        Arc::clone(&self.completions)
    }

    #[must_use]
    pub fn saved_words(&self) -> Arc<SavedWordsService> {
        Arc::clone(&self.saved_words)
    }

    /// Open a quiz over `collection` and rehydrate its progress.
    ///
    /// Returns the started session together with the events of the load.
    ///
    /// Progress is stored under global keys, not per collection, so a new
    /// quiz resumes wherever the last one stopped. An index equal to this
    /// collection's question count opens it as `Won`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the session cannot be started.
    ///
    /// # Panics
    ///
    /// Panics if `collection` is not part of the question bank.
    pub async fn start_quiz(
        &self,
        collection: &CollectionId,
    ) -> Result<(QuizSession, Vec<QuizEvent>), QuizError> {
        let questions = Arc::clone(self.bank.shared(collection));
        let mut session = QuizSession::new(
            collection.clone(),
            questions,
            self.config.max_lives,
            self.progress.clone(),
        )?;
        let events = session.start().await?;
        Ok((session, events))
    }
}
