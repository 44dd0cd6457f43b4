//! The [`JobRow`] model and its [`JobState`] lifecycle enum.

use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::schema::job_queue;

/// Lifecycle state of a [`JobRow`].
///
/// Transitions: `Pending -> InProgress` (claim), `InProgress -> {Completed,
/// Failed}` (outcome), `InProgress -> Pending` (requeue). No row jumps
/// directly from `Pending` to `Completed` or `Failed`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::JobState"]
pub enum JobState {
    /// Queued, unclaimed, eligible for `claim_next`.
    #[db_rename = "pending"]
    #[serde(rename = "pending")]
    #[default]
    Pending,

    /// Claimed by a worker; `claimed_by` and `started_at` are set.
    #[db_rename = "in_progress"]
    #[serde(rename = "in_progress")]
    InProgress,

    /// Finished successfully. Eligible for garbage collection.
    #[db_rename = "completed"]
    #[serde(rename = "completed")]
    Completed,

    /// Finished unsuccessfully. Retained for inspection.
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,
}

impl JobState {
    /// Whether a row in this state must carry `claimed_by` and `started_at`.
    #[inline]
    pub fn is_claimed(self) -> bool {
        matches!(self, JobState::InProgress)
    }
}

/// The sole persisted entity of the queue store.
///
/// See the `job_queue` migration for the invariants enforced at the database
/// level: `IN_PROGRESS` rows always carry a claim, idle rows never do.
#[derive(Debug, Clone, PartialEq, Queryable, QueryableByName, Selectable, Identifiable)]
#[diesel(table_name = job_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    pub id: Uuid,
    pub name: String,
    pub job_type: String,
    /// Serialized, runner-specific payload (self-describing text, e.g. JSON).
    pub config_blob: String,
    pub state: JobState,
    pub priority: i32,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub claimed_by: Option<String>,
    pub retries: i32,
}

/// Data required to insert a new `PENDING` row.
///
/// `id` and `created_at` are assigned by [`QueueStore::add`] / [`QueueStore::add_batch`]
/// rather than by the caller, matching the spec's "assigns `created_at=now`" contract.
///
/// [`QueueStore::add`]: super::QueueStore::add
/// [`QueueStore::add_batch`]: super::QueueStore::add_batch
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = job_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewJobRow {
    pub id: Uuid,
    pub name: String,
    pub job_type: String,
    pub config_blob: String,
    pub priority: i32,
    pub created_at: Timestamp,
}

impl NewJobRow {
    /// Builds a new pending row with a fresh id, stamping `created_at=now`.
    pub fn new(
        name: impl Into<String>,
        job_type: impl Into<String>,
        config_blob: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            job_type: job_type.into(),
            config_blob: config_blob.into(),
            priority,
            created_at: Timestamp::from(jiff::Timestamp::now()),
        }
    }
}
