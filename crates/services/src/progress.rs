use std::sync::Arc;

use quiz_core::model::QuizProgress;
use storage::keys;
use storage::repository::{KeyValueStore, StorageError};

use crate::notice::NoticeLatch;

/// Raw progress values read back from storage. `None` means absent,
/// unreadable or not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredProgress {
    pub current_question_index: Option<u32>,
    pub lives_remaining: Option<u32>,
}

/// Reads and writes the quiz progress scalars.
///
/// Best effort: failures are logged, reported to the notice latch and never
/// returned from [`ProgressGateway::load`].
#[derive(Clone)]
pub struct ProgressGateway {
    store: Arc<dyn KeyValueStore>,
    notice: NoticeLatch,
}

impl ProgressGateway {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, notice: NoticeLatch) -> Self {
        Self { store, notice }
    }

    #[must_use]
    pub fn notice(&self) -> &NoticeLatch {
        &self.notice
    }

    pub async fn load(&self) -> StoredProgress {
        StoredProgress {
            lives_remaining: self.read_u32(keys::LIVES).await,
            current_question_index: self.read_u32(keys::CURRENT_QUESTION_INDEX).await,
        }
    }

    /// Write both scalars.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError`; the failure is also reported to the
    /// notice latch.
    pub async fn save(&self, progress: QuizProgress) -> Result<(), StorageError> {
        let result = async {
            self.store
                .set(keys::LIVES, &progress.lives_remaining.to_string())
                .await?;
            self.store
                .set(
                    keys::CURRENT_QUESTION_INDEX,
                    &progress.current_question_index.to_string(),
                )
                .await
        }
        .await;
        if result.is_err() {
            self.notice.report();
        }
        result
    }

    async fn read_u32(&self, key: &str) -> Option<u32> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::debug!(key, value = %raw, "ignoring malformed progress value");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "progress read failed, using defaults");
                self.notice.report();
                None
            }
        }
    }
}
