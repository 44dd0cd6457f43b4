//! Shared startup plumbing for every subcommand that touches the
//! database: connecting, migrating, and assembling the two process-wide
//! registries (§4.6 "Static registration, no dynamic loading").

use std::sync::Arc;

use gemforge_core::{Error, Result};
use gemforge_jobs::RunnerRegistry;
use gemforge_pipeline::PluginRegistry;
use gemforge_postgres::{PgClientMigrationExt, PgConfig, QueueStore};
use tokio::process::Command;

/// Connects to Postgres, applies pending migrations, and wraps the client
/// in a [`QueueStore`].
pub async fn connect(db_url: &str) -> Result<QueueStore> {
    let client = PgConfig::new(db_url)
        .build()
        .map_err(|err| Error::configuration().with_message(err.to_string()).with_source(err))?;

    let result = client
        .run_pending_migrations()
        .await
        .map_err(|err| Error::internal().with_message(err.to_string()).with_source(err))?;
    tracing::info!(
        migrations_processed = result.processed_versions.len(),
        "database migrations applied"
    );

    Ok(QueueStore::new(client))
}

/// Builds the process-wide job runner registry: built-ins only (§4.6).
pub fn runner_registry() -> RunnerRegistry {
    let mut registry = RunnerRegistry::new();
    gemforge_jobs::builtin::register_all(&mut registry);
    registry
}

/// Builds the process-wide formatter plugin registry: built-ins only
/// (§4.6).
pub fn plugin_registry() -> PluginRegistry {
    gemforge_pipeline::builtin::register_all(PluginRegistry::builder()).build()
}

/// Builds the pooler's `command_factory`: re-execs this same binary into
/// its hidden `worker` mode (§4.4 "Single-process-multi-worker model").
/// `DB_URL` is passed explicitly so a worker started from a `--db-url`
/// flag (rather than a true environment variable) still inherits it.
pub fn worker_command_factory(db_url: String) -> Result<Arc<dyn Fn(&str) -> Command + Send + Sync>> {
    let exe = std::env::current_exe()
        .map_err(|err| Error::internal().with_message(err.to_string()).with_source(err))?;

    Ok(Arc::new(move |worker_id: &str| {
        let mut command = Command::new(&exe);
        command.arg("worker").arg(worker_id).env("DB_URL", &db_url);
        command
    }))
}
