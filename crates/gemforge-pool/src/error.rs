//! Error types for the worker pool.

use thiserror::Error;

/// Errors raised by the pooler and its worker supervisors.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A worker didn't ack its `Stop` and its force-kill also failed (§4.4,
    /// §7 `WORKER_SHUTDOWN_ERROR`) — the only pool error that escalates
    /// rather than being logged and suppressed.
    #[error("worker '{worker_id}' refused to shut down: {message}")]
    WorkerShutdownError { worker_id: String, message: String },

    /// Failed to spawn a worker process.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The IPC channel to a worker closed or produced a malformed frame.
    #[error("IPC error with worker '{worker_id}': {message}")]
    Ipc { worker_id: String, message: String },

    /// The queue store returned an error while balancing or claiming.
    #[error("queue error: {0}")]
    Queue(#[from] gemforge_postgres::PgError),

    /// A job's runner returned an error.
    #[error("job error: {0}")]
    Job(#[from] gemforge_jobs::JobError),
}

/// Specialized [`Result`] type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
