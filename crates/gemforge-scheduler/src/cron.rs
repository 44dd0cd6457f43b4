//! [`CronScheduler`]: reserved for future cron-driven periodic re-enqueue
//! (§4.5). Implements the same lifecycle hooks as every other mode; no
//! periodic behavior is mandated yet.

use async_trait::async_trait;
use gemforge_postgres::QueueStore;

use crate::error::SchedulerResult;
use crate::scheduler::Scheduler;

/// Placeholder cron-driven scheduler. `start`/`tick`/`stop` currently no-op
/// beyond logging; re-enqueue-on-schedule behavior is not yet specified.
pub struct CronScheduler {
    #[allow(dead_code)]
    queue: QueueStore,
}

impl CronScheduler {
    pub fn new(queue: QueueStore) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl Scheduler for CronScheduler {
    async fn start(&mut self) -> SchedulerResult<()> {
        tracing::warn!("cron scheduler started; no periodic re-enqueue is implemented yet");
        Ok(())
    }

    async fn tick(&mut self) -> SchedulerResult<()> {
        Ok(())
    }

    async fn stop(&mut self) -> SchedulerResult<()> {
        Ok(())
    }
}
