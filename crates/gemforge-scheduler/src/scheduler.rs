//! The [`Scheduler`] trait: the three lifecycle hooks every scheduling
//! mode implements (§4.5).

use async_trait::async_trait;

use crate::error::SchedulerResult;

/// Translates a user request into enqueued rows, observes completion, and
/// signals shutdown. Driven by a [`crate::SchedulerRunner`], which owns it
/// by composition rather than by inheritance (§9 "Scheduler base-class
/// coupling").
#[async_trait]
pub trait Scheduler: Send {
    /// Enqueues whatever rows this run requires.
    async fn start(&mut self) -> SchedulerResult<()>;

    /// Called once per `tick_rate`; observes queue state and may request
    /// shutdown (by clearing the shared `running` flag).
    async fn tick(&mut self) -> SchedulerResult<()>;

    /// Called once after the run loop exits; typically purges completed
    /// rows left over from this run.
    async fn stop(&mut self) -> SchedulerResult<()>;
}
