//! The runner's default `retry()` discipline (§4.3, §7 `TRANSIENT_DB_ERROR`
//! and `RUNNER_ERROR` both ultimately flow through here).

use gemforge_postgres::QueueStore;
use uuid::Uuid;

use crate::error::JobResult;
use crate::runner::ErasedRunner;

/// Runs `runner.cleanup()`, then either requeues or permanently fails the
/// job per §4.3's default `retry()`:
///
/// 1. `cleanup()` always runs first.
/// 2. If `!should_rerun()`, mark FAILED.
/// 3. Else if the row's `retries` (after incrementing) is still within
///    `max_retries()`, increment and re-mark PENDING, clearing the claim.
/// 4. Else mark FAILED.
pub async fn retry(
    runner: &mut dyn ErasedRunner,
    queue: &QueueStore,
    job_id: Uuid,
) -> JobResult<()> {
    let cleanup_result = runner.cleanup().await;

    if !runner.should_rerun() {
        queue.mark_failed(job_id).await?;
        return cleanup_result;
    }

    let new_count = queue.increment_retries(job_id).await?;
    if new_count <= runner.max_retries() {
        queue.mark_pending(job_id).await?;
    } else {
        queue.mark_failed(job_id).await?;
    }

    cleanup_result
}
