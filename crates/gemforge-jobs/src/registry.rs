//! [`RunnerRegistry`]: the runner half of the plugin registry (§4.6).
//!
//! A name (`job_type`) keyed map to a `(decode_payload_fn, constructor)`
//! pair, collapsed into a single boxed async factory so the payload type
//! parameter never appears in the registry's own type.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gemforge_postgres::JobRow;
use serde::de::DeserializeOwned;

use crate::error::{JobError, JobResult};
use crate::runner::{ErasedRunner, Runner, RunnerContext};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type RunnerFactory = Arc<
    dyn Fn(JobRow, RunnerContext) -> BoxFuture<'static, JobResult<Box<dyn ErasedRunner>>>
        + Send
        + Sync,
>;

/// Process-wide registry of job runners, keyed by `job_type`.
#[derive(Clone, Default)]
pub struct RunnerRegistry {
    factories: HashMap<String, RunnerFactory>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers runner `R` (with payload type `P`) under `job_type`.
    /// Replaces any runner already registered under that name.
    pub fn register<P, R>(&mut self, job_type: impl Into<String>)
    where
        P: DeserializeOwned + Send + Sync + 'static,
        R: Runner<P> + 'static,
    {
        let factory: RunnerFactory = Arc::new(move |job: JobRow, ctx: RunnerContext| {
            Box::pin(async move {
                let payload: P = serde_json::from_str(&job.config_blob)
                    .map_err(|err| JobError::InvalidPayload(err.to_string()))?;
                let runner = R::construct(job, payload, ctx).await?;
                Ok(Box::new(runner) as Box<dyn ErasedRunner>)
            })
        });
        self.factories.insert(job_type.into(), factory);
    }

    /// Whether a runner is registered for `job_type`.
    pub fn contains(&self, job_type: &str) -> bool {
        self.factories.contains_key(job_type)
    }

    /// Decodes the row's payload and constructs the registered runner.
    ///
    /// Returns [`JobError::UnknownJobType`] if nothing is registered for
    /// `job.job_type` (§4.3: "hard error inside the worker").
    pub async fn construct(
        &self,
        job: JobRow,
        ctx: RunnerContext,
    ) -> JobResult<Box<dyn ErasedRunner>> {
        let factory = self
            .factories
            .get(&job.job_type)
            .cloned()
            .ok_or_else(|| JobError::UnknownJobType(job.job_type.clone()))?;
        factory(job, ctx).await
    }
}
