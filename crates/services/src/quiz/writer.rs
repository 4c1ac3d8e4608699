use std::sync::Arc;

use quiz_core::model::QuizProgress;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::progress::ProgressGateway;

/// Fire-and-forget progress writes for one session.
///
/// Writes run on the runtime captured at session start. They are serialized
/// and tagged with a generation, so a write that loses the race to a newer
/// one is dropped instead of overwriting fresher progress.
pub(crate) struct ProgressWriter {
    gateway: ProgressGateway,
    runtime: Handle,
    written: Arc<Mutex<u64>>,
    generation: u64,
    pending: Vec<JoinHandle<()>>,
}

impl ProgressWriter {
    pub(crate) fn new(gateway: ProgressGateway, runtime: Handle) -> Self {
        Self {
            gateway,
            runtime,
            written: Arc::new(Mutex::new(0)),
            generation: 0,
            pending: Vec::new(),
        }
    }

    pub(crate) fn dispatch(&mut self, progress: QuizProgress) {
        self.generation += 1;
        let generation = self.generation;
        let gateway = self.gateway.clone();
        let written = Arc::clone(&self.written);

        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(self.runtime.spawn(async move {
            let mut last = written.lock().await;
            if *last > generation {
                tracing::debug!(generation, latest = *last, "skipping stale progress write");
                return;
            }
            if let Err(err) = gateway.save(progress).await {
                tracing::warn!(error = %err, "failed to persist quiz progress");
            }
            *last = generation;
        }));
    }

    /// Wait for every dispatched write to finish.
    pub(crate) async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "progress write task failed");
            }
        }
    }
}
