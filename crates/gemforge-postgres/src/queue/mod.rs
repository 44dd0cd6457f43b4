//! The queue store: transactional backing store for job rows with atomic
//! claim semantics.
//!
//! The `job_queue` table is declared `UNLOGGED` (see the migration under
//! `src/migrations/`): durability across a crash is explicitly not a goal,
//! and skipping the write-ahead log keeps claim/requeue cheap under load.

mod model;
mod store;

pub use model::{JobState, JobRow, NewJobRow};
pub use store::{ClaimedJob, QueueStatus, QueueStore};
