use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use quiz_core::model::{CollectionId, CompletionKind, CompletionSet, QuizEvent};
use storage::keys;
use storage::repository::KeyValueStore;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::notice::NoticeLatch;

/// Process-wide record of completed collections.
///
/// Storage is the source of truth and the in-memory mirror a cache that the
/// collection browser reads synchronously. Each kind has its own write lock
/// so a read-modify-write on one set never races another on the same set,
/// while flashcard and quiz updates still run concurrently.
pub struct CompletionRegistry {
    store: Arc<dyn KeyValueStore>,
    notice: NoticeLatch,
    flashcards: CompletionSlot,
    quiz: CompletionSlot,
}

struct CompletionSlot {
    key: &'static str,
    mirror: RwLock<CompletionSet>,
    write: Mutex<()>,
    // Set once the stored set has been read; until then a failed read must
    // not be followed by a write of the mirror alone.
    loaded: AtomicBool,
}

impl CompletionSlot {
    fn new(key: &'static str) -> Self {
        Self {
            key,
            mirror: RwLock::new(CompletionSet::new()),
            write: Mutex::new(()),
            loaded: AtomicBool::new(false),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> CompletionSet {
        self.mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, set: CompletionSet) {
        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = set;
    }
}

impl CompletionRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, notice: NoticeLatch) -> Self {
        Self {
            store,
            notice,
            flashcards: CompletionSlot::new(keys::COMPLETED_FLASHCARDS),
            quiz: CompletionSlot::new(keys::COMPLETED_QUIZ),
        }
    }

    fn slot(&self, kind: CompletionKind) -> &CompletionSlot {
        match kind {
            CompletionKind::Flashcards => &self.flashcards,
            CompletionKind::Quiz => &self.quiz,
        }
    }

    /// Load both sets from storage into the mirror. Call once at startup.
    pub async fn hydrate(&self) {
        for kind in CompletionKind::ALL {
            let slot = self.slot(kind);
            let _guard = slot.write.lock().await;
            if let Some(stored) = self.read_stored(slot.key).await {
                let mut merged = slot.snapshot();
                merged.extend(&stored);
                slot.replace(merged);
                slot.loaded.store(true, Ordering::Release);
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self, kind: CompletionKind, collection: &CollectionId) -> bool {
        self.slot(kind)
            .mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(collection)
    }

    #[must_use]
    pub fn snapshot(&self, kind: CompletionKind) -> CompletionSet {
        self.slot(kind).snapshot()
    }

    pub async fn mark_flashcards_complete(&self, collection: CollectionId) -> QuizEvent {
        self.mark_complete(CompletionKind::Flashcards, collection)
            .await
    }

    pub async fn mark_quiz_complete(&self, collection: CollectionId) -> QuizEvent {
        self.mark_complete(CompletionKind::Quiz, collection).await
    }

    /// Add `collection` to the `kind` set and write the whole set back.
    ///
    /// The mirror is updated before the write is awaited. A failed write is
    /// logged and reported to the notice latch; the mirror keeps the entry
    /// and the next successful write for this kind carries it. If the stored
    /// set has never been read, the write is skipped so the durable set is
    /// not replaced by the mirror alone.
    #[instrument(skip(self), fields(collection = %collection))]
    pub async fn mark_complete(&self, kind: CompletionKind, collection: CollectionId) -> QuizEvent {
        let slot = self.slot(kind);
        let _guard = slot.write.lock().await;

        let stored = self.read_stored(slot.key).await;
        let mut set = slot.snapshot();
        if let Some(stored) = &stored {
            set.extend(stored);
            slot.loaded.store(true, Ordering::Release);
        }
        let added = set.insert(collection.clone());
        slot.replace(set.clone());

        if added {
            tracing::info!(%kind, "collection marked complete");
        }
        if !slot.is_loaded() {
            tracing::warn!(%kind, "stored completion set unknown, write deferred");
            return QuizEvent::CollectionMarkedComplete { collection, kind };
        }
        match set.to_json() {
            Ok(raw) => {
                if let Err(err) = self.store.set(slot.key, &raw).await {
                    tracing::warn!(%kind, error = %err, "failed to persist completion set");
                    self.notice.report();
                }
            }
            Err(err) => tracing::warn!(%kind, error = %err, "failed to encode completion set"),
        }

        QuizEvent::CollectionMarkedComplete { collection, kind }
    }

    /// `None` when the store could not be read. Malformed data reads as empty.
    async fn read_stored(&self, key: &'static str) -> Option<CompletionSet> {
        match self.store.get(key).await {
            Ok(Some(raw)) => Some(CompletionSet::from_json(&raw).unwrap_or_else(|err| {
                tracing::debug!(key, error = %err, "ignoring malformed completion set");
                CompletionSet::new()
            })),
            Ok(None) => Some(CompletionSet::new()),
            Err(err) => {
                tracing::warn!(key, error = %err, "completion read failed");
                self.notice.report();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryStore;

    fn id(key: &str) -> CollectionId {
        CollectionId::new(key).unwrap()
    }

    fn registry(store: &InMemoryStore) -> CompletionRegistry {
        CompletionRegistry::new(Arc::new(store.clone()), NoticeLatch::new())
    }

    #[tokio::test]
    async fn hydrate_reads_both_sets() {
        let store = InMemoryStore::new();
        store
            .set(keys::COMPLETED_FLASHCARDS, r#"["family"]"#)
            .await
            .unwrap();
        store
            .set(keys::COMPLETED_QUIZ, r#"{"animals":true}"#)
            .await
            .unwrap();

        let registry = registry(&store);
        registry.hydrate().await;

        assert!(registry.is_complete(CompletionKind::Flashcards, &id("family")));
        assert!(registry.is_complete(CompletionKind::Quiz, &id("animals")));
        assert!(!registry.is_complete(CompletionKind::Quiz, &id("family")));
    }

    #[tokio::test]
    async fn marking_twice_is_idempotent() {
        let store = InMemoryStore::new();
        let registry = registry(&store);

        registry.mark_quiz_complete(id("animals")).await;
        let once = store.get(keys::COMPLETED_QUIZ).await.unwrap();
        let event = registry.mark_quiz_complete(id("animals")).await;
        let twice = store.get(keys::COMPLETED_QUIZ).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.as_deref(), Some(r#"["animals"]"#));
        assert_eq!(registry.snapshot(CompletionKind::Quiz).len(), 1);
        assert_eq!(
            event,
            QuizEvent::CollectionMarkedComplete {
                collection: id("animals"),
                kind: CompletionKind::Quiz
            }
        );
    }

    #[tokio::test]
    async fn kinds_are_stored_under_separate_keys() {
        let store = InMemoryStore::new();
        let registry = registry(&store);

        registry.mark_flashcards_complete(id("family")).await;

        assert_eq!(
            store
                .get(keys::COMPLETED_FLASHCARDS)
                .await
                .unwrap()
                .as_deref(),
            Some(r#"["family"]"#)
        );
        assert_eq!(store.get(keys::COMPLETED_QUIZ).await.unwrap(), None);
        assert!(!registry.is_complete(CompletionKind::Quiz, &id("family")));
    }

    #[tokio::test]
    async fn malformed_stored_set_is_replaced() {
        let store = InMemoryStore::new();
        store.set(keys::COMPLETED_QUIZ, "{oops").await.unwrap();
        let registry = registry(&store);
        registry.hydrate().await;
        assert!(registry.snapshot(CompletionKind::Quiz).is_empty());

        registry.mark_quiz_complete(id("animals")).await;
        assert_eq!(
            store.get(keys::COMPLETED_QUIZ).await.unwrap().as_deref(),
            Some(r#"["animals"]"#)
        );
    }
}
