//! [`SchedulerRunner`]: owns the tick loop, the shared `running` flag, and a
//! background garbage-collector task (§4.5).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gemforge_postgres::QueueStore;

use crate::error::SchedulerResult;
use crate::scheduler::Scheduler;

/// Default tick period for the run loop (§4.5: "default 1 s").
pub const DEFAULT_TICK_RATE: Duration = Duration::from_secs(1);
/// Default period of the background garbage collector (§4.5: "default
/// every 120 s").
pub const DEFAULT_GC_PERIOD: Duration = Duration::from_secs(120);

/// Tunables for [`SchedulerRunner`].
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub tick_rate: Duration,
    pub gc_period: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            gc_period: DEFAULT_GC_PERIOD,
        }
    }
}

/// Drives a boxed [`Scheduler`] to completion: calls `start` once, then
/// `tick` on every `tick_rate` until the shared `running` flag is cleared
/// (by the scheduler itself, or by an external shutdown signal), then
/// `stop` once. A background task concurrently calls `queue.purge_completed`
/// every `gc_period`, independent of which scheduling mode is active.
///
/// Owns the scheduler by composition, not inheritance (§9 "Scheduler
/// base-class coupling").
pub struct SchedulerRunner {
    scheduler: Box<dyn Scheduler>,
    queue: QueueStore,
    config: RunnerConfig,
    running: Arc<AtomicBool>,
}

impl SchedulerRunner {
    pub fn new(
        scheduler: Box<dyn Scheduler>,
        queue: QueueStore,
        config: RunnerConfig,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self { scheduler, queue, config, running }
    }

    /// Runs until `running` is cleared, either by the scheduler's own
    /// `tick` (e.g. [`crate::OneShotScheduler`] draining) or by the caller
    /// clearing it from outside (e.g. a signal handler).
    pub async fn run(&mut self) -> SchedulerResult<()> {
        self.scheduler.start().await?;

        let gc_queue = self.queue.clone();
        let gc_running = Arc::clone(&self.running);
        let gc_period = self.config.gc_period;
        let gc_handle = tokio::spawn(async move {
            collect_garbage(gc_queue, gc_running, gc_period).await;
        });

        while self.running.load(Ordering::SeqCst) {
            tokio::time::sleep(self.config.tick_rate).await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            if let Err(err) = self.scheduler.tick().await {
                tracing::error!(%err, "scheduler tick failed, suppressing (§7)");
            }
        }

        gc_handle.abort();
        self.scheduler.stop().await
    }
}

async fn collect_garbage(queue: QueueStore, running: Arc<AtomicBool>, period: Duration) {
    while running.load(Ordering::SeqCst) {
        tokio::time::sleep(period).await;
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match queue.purge_completed().await {
            Ok(purged) => tracing::debug!(purged, "garbage collector purged completed rows"),
            Err(err) => tracing::error!(%err, "garbage collector purge failed, suppressing (§7)"),
        }
    }
}
