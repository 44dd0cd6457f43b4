//! Error types for scheduling.

use thiserror::Error;

/// Errors raised while starting, ticking, or stopping a scheduler run.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The queue store returned an error while enqueueing, polling status,
    /// or purging.
    #[error("queue error: {0}")]
    Queue(#[from] gemforge_postgres::PgError),

    /// `scheduler_mode` wasn't one of the recognized values (§4.5:
    /// "unknown values ⇒ logged error, scheduler does not start").
    #[error("unrecognized scheduler mode: '{0}'")]
    UnknownMode(String),
}

/// Specialized [`Result`] type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
