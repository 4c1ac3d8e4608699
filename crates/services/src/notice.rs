use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use quiz_core::model::QuizEvent;

const CLEAR: u8 = 0;
const PENDING: u8 = 1;
const DELIVERED: u8 = 2;

/// Process-wide latch for the one-time "storage unavailable" notice.
///
/// Any number of failures can be reported; the notice is handed out once.
#[derive(Debug, Clone, Default)]
pub struct NoticeLatch {
    state: Arc<AtomicU8>,
}

impl NoticeLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a storage failure.
    pub fn report(&self) {
        let _ = self
            .state
            .compare_exchange(CLEAR, PENDING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Take the pending notice, if it has not been delivered yet.
    #[must_use]
    pub fn take(&self) -> Option<QuizEvent> {
        self.state
            .compare_exchange(PENDING, DELIVERED, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| QuizEvent::StorageUnavailable)
    }
}
