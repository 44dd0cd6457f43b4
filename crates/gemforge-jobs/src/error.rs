//! Error types for job execution.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while decoding, constructing, or running a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// `config_blob` didn't deserialize into the runner's payload type.
    #[error("invalid job payload: {0}")]
    InvalidPayload(String),

    /// No runner is registered for a row's `job_type` (§4.3 "unknown
    /// `job_type` in registry ⇒ hard error inside the worker").
    #[error("no runner registered for job_type '{0}'")]
    UnknownJobType(String),

    /// `run()` failed (§7 `RUNNER_ERROR`); carries the job id for logging.
    #[error("job {job_id} failed: {message}")]
    RunFailed { job_id: Uuid, message: String },

    /// The queue store returned an error while the runner was reading or
    /// writing job state.
    #[error("queue error: {0}")]
    Queue(#[from] gemforge_postgres::PgError),

    /// An I/O failure while reading or writing files (the `formatter`
    /// runner's directory fan-out, file conversion).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized [`Result`] type for job operations.
pub type JobResult<T> = Result<T, JobError>;
