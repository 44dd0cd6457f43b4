//! Prelude module for gemforge-postgres.
//!
//! Re-exports the types most callers need with a single `use` statement.
//!
//! # Example
//!
//! ```rust,no_run
//! use gemforge_postgres::prelude::*;
//!
//! # async fn example() -> PgResult<()> {
//! let client = PgConfig::new("postgresql://localhost/gemforge").build()?;
//! let store = QueueStore::new(client);
//! let status = store.status().await?;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

pub use diesel::prelude::*;
pub use diesel_async::RunQueryDsl;

pub use crate::PgConnection;
pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientMigrationExt, PgConfig,
    PgPoolStatus,
};
pub use crate::queue::{ClaimedJob, JobRow, JobState, NewJobRow, QueueStatus, QueueStore};
pub use crate::{PgError, PgResult};
