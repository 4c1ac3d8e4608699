use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{SavedWord, SavedWordDraft, SavedWordId};
use storage::keys;
use storage::repository::KeyValueStore;
use tokio::sync::Mutex;

use crate::error::SavedWordsServiceError;

/// The learner's personal word list, stored as one JSON array.
pub struct SavedWordsService {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
    write: Mutex<()>,
}

impl SavedWordsService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store,
            write: Mutex::new(()),
        }
    }

    /// Saved words, newest first. Absent, unreadable or malformed data reads
    /// as an empty list.
    pub async fn list(&self) -> Vec<SavedWord> {
        self.load().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "saved words unavailable");
            Vec::new()
        })
    }

    /// Validate `draft` and put it at the front of the list.
    ///
    /// The stored list is never replaced unless it was read successfully.
    ///
    /// # Errors
    ///
    /// Returns `SavedWordsServiceError::Validation` for bad input,
    /// `SavedWordsServiceError::Storage` if the list cannot be read or written
    /// and `SavedWordsServiceError::Malformed` if the stored list cannot be
    /// parsed.
    pub async fn add(&self, draft: SavedWordDraft) -> Result<SavedWord, SavedWordsServiceError> {
        let word = draft.validate(SavedWordId::generate(), self.clock.now())?;

        let _guard = self.write.lock().await;
        let mut words = self.load().await?;
        words.insert(0, word.clone());
        let raw = serde_json::to_string(&words)?;
        self.store.set(keys::SAVED_WORDS, &raw).await?;

        tracing::debug!(id = %word.id, total = words.len(), "word saved");
        Ok(word)
    }

    async fn load(&self) -> Result<Vec<SavedWord>, SavedWordsServiceError> {
        match self.store.get(keys::SAVED_WORDS).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(SavedWordsServiceError::Malformed),
            None => Ok(Vec::new()),
        }
    }
}
