//! [`QueueStore`]: the transactional backing store for job rows.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::model::{JobRow, JobState, NewJobRow};
use crate::schema::job_queue;
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY};

/// The id and job type of a row claimed by [`QueueStore::claim_next`].
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName)]
pub struct ClaimedJob {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Text)]
    pub job_type: String,
}

/// A snapshot of the queue's pending/in-progress counters.
///
/// `pending_ratio` is `pending / (pending + in_progress)`, or `0.0` when both
/// counters are zero — this is what [`crate::PoolBalancer`](../../gemforge_pool)
/// reads to decide whether to grow or shrink the worker pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueStatus {
    pub pending: u64,
    pub in_progress: u64,
}

impl QueueStatus {
    /// `pending / (pending + in_progress)`, or `0.0` if both are zero.
    pub fn pending_ratio(&self) -> f64 {
        let total = self.pending + self.in_progress;
        if total == 0 {
            0.0
        } else {
            self.pending as f64 / total as f64
        }
    }
}

/// Transactional backing store for [`JobRow`]s with atomic claim semantics.
///
/// `QueueStore` is a thin, cloneable handle over a [`PgClient`] connection
/// pool; the claim operation is the only contention point and relies on
/// Postgres's `FOR UPDATE SKIP LOCKED` so concurrent workers never observe
/// the same row.
#[derive(Debug, Clone)]
pub struct QueueStore {
    pg: PgClient,
}

impl QueueStore {
    /// Wraps an existing database client as a queue store.
    pub fn new(pg: PgClient) -> Self {
        Self { pg }
    }

    /// Inserts a single `PENDING` row.
    #[tracing::instrument(skip(self, row), target = TRACING_TARGET_QUERY)]
    pub async fn add(&self, row: NewJobRow) -> PgResult<JobRow> {
        let mut conn = self.pg.get_connection().await?;
        let inserted = diesel::insert_into(job_queue::table)
            .values(&row)
            .returning(job_queue::all_columns)
            .get_result::<JobRow>(&mut *conn)
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            job_id = %inserted.id,
            job_type = %inserted.job_type,
            "Enqueued job"
        );
        Ok(inserted)
    }

    /// Inserts a batch of `PENDING` rows in one statement.
    #[tracing::instrument(skip(self, rows), target = TRACING_TARGET_QUERY)]
    pub async fn add_batch(&self, rows: Vec<NewJobRow>) -> PgResult<Vec<JobRow>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pg.get_connection().await?;
        let inserted = diesel::insert_into(job_queue::table)
            .values(&rows)
            .returning(job_queue::all_columns)
            .get_results::<JobRow>(&mut *conn)
            .await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, count = inserted.len(), "Enqueued job batch");
        Ok(inserted)
    }

    /// Atomically selects the highest-priority, oldest `PENDING` row and
    /// transitions it to `IN_PROGRESS`, stamping `claimed_by` and
    /// `started_at`. Returns `None` if no row is available.
    ///
    /// Implemented as a single `UPDATE ... WHERE id = (SELECT ... FOR UPDATE
    /// SKIP LOCKED LIMIT 1)` statement: two concurrent callers can never
    /// observe the same row, and a caller that finds every candidate already
    /// locked simply returns `None` rather than blocking.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn claim_next(&self, worker_id: &str) -> PgResult<Option<ClaimedJob>> {
        let mut conn = self.pg.get_connection().await?;

        let claimed = diesel::sql_query(
            "UPDATE job_queue SET state = 'in_progress', claimed_by = $1, started_at = now() \
             WHERE id = ( \
                 SELECT id FROM job_queue \
                 WHERE state = 'pending' \
                 ORDER BY priority DESC, created_at ASC \
                 FOR UPDATE SKIP LOCKED \
                 LIMIT 1 \
             ) \
             RETURNING id, job_type",
        )
        .bind::<Text, _>(worker_id)
        .get_results::<ClaimedJob>(&mut *conn)
        .await?;

        let claimed = claimed.into_iter().next();
        if let Some(job) = &claimed {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                job_id = %job.id,
                job_type = %job.job_type,
                worker_id,
                "Claimed job"
            );
        }
        Ok(claimed)
    }

    /// Transitions a row to `COMPLETED`, clearing its claim.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn mark_completed(&self, id: Uuid) -> PgResult<()> {
        self.transition(id, JobState::Completed).await
    }

    /// Transitions a row to `FAILED`, clearing its claim.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn mark_failed(&self, id: Uuid) -> PgResult<()> {
        self.transition(id, JobState::Failed).await
    }

    /// Requeues a row: transitions it back to `PENDING` and clears `claimed_by`.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn mark_pending(&self, id: Uuid) -> PgResult<()> {
        self.transition(id, JobState::Pending).await
    }

    async fn transition(&self, id: Uuid, state: JobState) -> PgResult<()> {
        let mut conn = self.pg.get_connection().await?;
        let rows = diesel::update(job_queue::table.find(id))
            .set((
                job_queue::state.eq(state),
                job_queue::claimed_by.eq(None::<String>),
            ))
            .execute(&mut *conn)
            .await?;

        if rows == 0 {
            return Err(PgError::EntryNotFound(id));
        }
        Ok(())
    }

    /// Increments the retry counter for a row and returns the new count.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn increment_retries(&self, id: Uuid) -> PgResult<i32> {
        let mut conn = self.pg.get_connection().await?;
        let rows = diesel::sql_query(
            "UPDATE job_queue SET retries = retries + 1 WHERE id = $1 RETURNING retries",
        )
        .bind::<SqlUuid, _>(id)
        .get_results::<RetryCount>(&mut *conn)
        .await?;

        rows.into_iter()
            .next()
            .map(|row| row.retries)
            .ok_or(PgError::EntryNotFound(id))
    }

    /// Returns the current pending/in-progress counters.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn status(&self) -> PgResult<QueueStatus> {
        let mut conn = self.pg.get_connection().await?;
        let rows = diesel::sql_query(
            "SELECT state::text AS state, count(*) AS count FROM job_queue \
             WHERE state IN ('pending', 'in_progress') GROUP BY state",
        )
        .get_results::<StateCount>(&mut *conn)
        .await?;

        let mut status = QueueStatus {
            pending: 0,
            in_progress: 0,
        };
        for row in rows {
            match row.state.as_str() {
                "pending" => status.pending = row.count as u64,
                "in_progress" => status.in_progress = row.count as u64,
                _ => {}
            }
        }
        Ok(status)
    }

    /// Removes all `COMPLETED` rows. Run periodically by the garbage collector.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn purge_completed(&self) -> PgResult<u64> {
        let mut conn = self.pg.get_connection().await?;
        let deleted = diesel::delete(
            job_queue::table.filter(job_queue::state.eq(JobState::Completed)),
        )
        .execute(&mut *conn)
        .await?;

        if deleted > 0 {
            tracing::debug!(target: TRACING_TARGET_QUERY, deleted, "Purged completed jobs");
        }
        Ok(deleted as u64)
    }

    /// Returns up to `limit` rows matching `name` and `state`.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn jobs_by_name_and_state(
        &self,
        name: &str,
        state: JobState,
        limit: i64,
    ) -> PgResult<Vec<JobRow>> {
        let mut conn = self.pg.get_connection().await?;
        let rows = job_queue::table
            .filter(job_queue::name.eq(name))
            .filter(job_queue::state.eq(state))
            .order(job_queue::created_at.asc())
            .limit(limit)
            .select(job_queue::all_columns)
            .load::<JobRow>(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// Upserts this worker's liveness row (DESIGN.md OQ-1 reaper). Called
    /// roughly every `tick_rate` by a worker's IPC-supervisor task.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn touch_heartbeat(&self, worker_id: &str) -> PgResult<()> {
        let mut conn = self.pg.get_connection().await?;
        diesel::sql_query(
            "INSERT INTO worker_heartbeat (worker_id, last_seen) VALUES ($1, now()) \
             ON CONFLICT (worker_id) DO UPDATE SET last_seen = now()",
        )
        .bind::<Text, _>(worker_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Removes a worker's heartbeat row, e.g. on graceful shutdown.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn forget_heartbeat(&self, worker_id: &str) -> PgResult<()> {
        let mut conn = self.pg.get_connection().await?;
        diesel::sql_query("DELETE FROM worker_heartbeat WHERE worker_id = $1")
            .bind::<Text, _>(worker_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Returns every `IN_PROGRESS` row whose `claimed_by` worker hasn't
    /// reported a heartbeat within `max_silence_secs` seconds (or has no
    /// heartbeat row at all). The caller (the pool's reaper) decides
    /// whether to requeue or fail each one via the normal `retry()` path.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn stale_claims(&self, max_silence_secs: i64) -> PgResult<Vec<JobRow>> {
        let mut conn = self.pg.get_connection().await?;
        let rows = diesel::sql_query(
            "SELECT job_queue.* FROM job_queue \
             LEFT JOIN worker_heartbeat ON worker_heartbeat.worker_id = job_queue.claimed_by \
             WHERE job_queue.state = 'in_progress' \
               AND (worker_heartbeat.last_seen IS NULL \
                    OR worker_heartbeat.last_seen < now() - make_interval(secs => $1))",
        )
        .bind::<BigInt, _>(max_silence_secs)
        .get_results::<JobRow>(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Looks up a single row by id.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    pub async fn get(&self, id: Uuid) -> PgResult<JobRow> {
        let mut conn = self.pg.get_connection().await?;
        job_queue::table
            .find(id)
            .select(job_queue::all_columns)
            .first::<JobRow>(&mut *conn)
            .await
            .map_err(|err| match err {
                diesel::result::Error::NotFound => PgError::EntryNotFound(id),
                other => PgError::Query(other),
            })
    }
}

#[derive(QueryableByName)]
struct RetryCount {
    #[diesel(sql_type = diesel::sql_types::Int4)]
    retries: i32,
}

#[derive(QueryableByName)]
struct StateCount {
    #[diesel(sql_type = Text)]
    state: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_ratio_zero_when_empty() {
        let status = QueueStatus { pending: 0, in_progress: 0 };
        assert_eq!(status.pending_ratio(), 0.0);
    }

    #[test]
    fn pending_ratio_matches_s6_scenario() {
        let status = QueueStatus { pending: 90, in_progress: 10 };
        assert!((status.pending_ratio() - 0.9).abs() < 1e-9);
    }
}
