//! [`OneShotScheduler`]: enqueues a fixed joblist once, then waits for the
//! queue to drain (§4.5).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gemforge_postgres::{NewJobRow, QueueStore};

use crate::error::SchedulerResult;
use crate::scheduler::Scheduler;

/// Enqueues every job in `jobs` on [`Scheduler::start`], then on each
/// [`Scheduler::tick`] checks whether the queue has drained
/// (`pending + in_progress == 0`); if so, clears the shared `running` flag.
/// [`Scheduler::stop`] purges completed rows.
pub struct OneShotScheduler {
    queue: QueueStore,
    jobs: Vec<NewJobRow>,
    running: Arc<AtomicBool>,
}

impl OneShotScheduler {
    pub fn new(queue: QueueStore, jobs: Vec<NewJobRow>, running: Arc<AtomicBool>) -> Self {
        Self { queue, jobs, running }
    }
}

#[async_trait]
impl Scheduler for OneShotScheduler {
    async fn start(&mut self) -> SchedulerResult<()> {
        let jobs = std::mem::take(&mut self.jobs);
        let count = jobs.len();
        self.queue.add_batch(jobs).await?;
        tracing::info!(count, "one-shot scheduler enqueued run");
        Ok(())
    }

    async fn tick(&mut self) -> SchedulerResult<()> {
        let status = self.queue.status().await?;
        if status.pending + status.in_progress == 0 {
            self.running.store(false, Ordering::SeqCst);
            tracing::info!("one-shot run drained, signalling shutdown");
        }
        Ok(())
    }

    async fn stop(&mut self) -> SchedulerResult<()> {
        let purged = self.queue.purge_completed().await?;
        tracing::debug!(purged, "one-shot scheduler purged completed rows on stop");
        Ok(())
    }
}
