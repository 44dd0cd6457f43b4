//! The typed runner contract (§4.3, §9 "Typed generic runners").

use async_trait::async_trait;
use gemforge_pipeline::PluginRegistry;
use gemforge_postgres::{JobRow, QueueStore};
use serde::de::DeserializeOwned;

use crate::error::JobResult;

/// Default retry ceiling for runners that don't override
/// [`Runner::MAX_RETRIES`] (§3 `retries <= MAX_RETRIES`).
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Shared handles a runner needs beyond its own payload: the queue (to
/// fan out child rows or inspect siblings) and the formatter registry (for
/// the built-in `formatter` runner's pipeline invocation).
#[derive(Clone)]
pub struct RunnerContext {
    pub queue: QueueStore,
    pub formatters: PluginRegistry,
}

impl RunnerContext {
    pub fn new(queue: QueueStore, formatters: PluginRegistry) -> Self {
        Self { queue, formatters }
    }
}

/// A typed job executor bound to a `job_type` and a payload type `P`.
///
/// The generic parameter never reaches [`crate::registry::RunnerRegistry`]:
/// registration erases it behind a boxed constructor (see
/// [`crate::registry::RunnerRegistry::register`]).
#[async_trait]
pub trait Runner<P>: Send + Sized
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    /// Whether a failed run should be retried at all (§3, §4.3 `retry()`).
    const SHOULD_RERUN: bool = true;

    /// Retry ceiling for this runner; `retries > MAX_RETRIES` ⇒ FAILED.
    const MAX_RETRIES: i32 = DEFAULT_MAX_RETRIES;

    /// Builds a runner instance from its claimed row and decoded payload.
    async fn construct(job: JobRow, payload: P, ctx: RunnerContext) -> JobResult<Self>;

    /// Optional setup hook, run before `run()`.
    async fn setup(&mut self) -> JobResult<()> {
        Ok(())
    }

    /// Performs the job's work.
    async fn run(&mut self) -> JobResult<()>;

    /// Cleanup hook, guaranteed to run on every exit path of `run()`.
    async fn cleanup(&mut self) -> JobResult<()> {
        Ok(())
    }
}

/// Object-safe view over a constructed [`Runner`], used once the payload
/// type has served its purpose in `construct`.
#[async_trait]
pub trait ErasedRunner: Send {
    async fn setup(&mut self) -> JobResult<()>;
    async fn run(&mut self) -> JobResult<()>;
    async fn cleanup(&mut self) -> JobResult<()>;
    fn should_rerun(&self) -> bool;
    fn max_retries(&self) -> i32;
}

#[async_trait]
impl<P, R> ErasedRunner for R
where
    P: DeserializeOwned + Send + Sync + 'static,
    R: Runner<P>,
{
    async fn setup(&mut self) -> JobResult<()> {
        Runner::<P>::setup(self).await
    }

    async fn run(&mut self) -> JobResult<()> {
        Runner::<P>::run(self).await
    }

    async fn cleanup(&mut self) -> JobResult<()> {
        Runner::<P>::cleanup(self).await
    }

    fn should_rerun(&self) -> bool {
        <R as Runner<P>>::SHOULD_RERUN
    }

    fn max_retries(&self) -> i32 {
        <R as Runner<P>>::MAX_RETRIES
    }
}
