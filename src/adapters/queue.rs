//! In-memory implementation of ReconciliationQueue.
//!
//! Collects the jobs the adapters hand over for out-of-band
//! reconciliation. A real consumer lives outside this layer.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{QueueError, ReconciliationJob, ReconciliationQueue};

#[derive(Default)]
pub struct InMemoryReconciliationQueue {
    jobs: Mutex<Vec<ReconciliationJob>>,
}

impl InMemoryReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all enqueued jobs.
    pub async fn drain(&self) -> Vec<ReconciliationJob> {
        let mut jobs = self.jobs.lock().await;
        std::mem::take(&mut *jobs)
    }
}

#[async_trait]
impl ReconciliationQueue for InMemoryReconciliationQueue {
    async fn enqueue(&self, job: ReconciliationJob) -> Result<(), QueueError> {
        self.jobs.lock().await.push(job);
        Ok(())
    }
}
