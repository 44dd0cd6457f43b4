//! `.env`/process-environment hydration (§6 "Environment (`.env`)").
//!
//! [`EnvConfig`] is a pure function of the process environment: every field
//! is sourced through clap's `env` attribute (the same idiom
//! `gemforge_postgres::PgConfig` uses), so the same values can be supplied
//! as flags, environment variables, or a `.env` file loaded by
//! [`load_dotenv`]. There is no global mutable config singleton (§9
//! "Dynamic plugin loading" reasoning applies equally here: explicit state,
//! passed around, not reached for).

use std::path::PathBuf;

use clap::Args;
use gemforge_core::{Error, ErrorKind, Result};

/// Default scheduler tick period, in milliseconds (§4.5 "default 1 s").
const DEFAULT_TICK_RATE_MS: u64 = 1_000;
/// Default worker pool ceiling (§4.4 `PoolConfig::default`).
const DEFAULT_MAX_WORKERS: usize = 4;
/// Default worker pool floor (§4.4 `PoolConfig::default`).
const DEFAULT_MIN_WORKERS: usize = 1;

/// Recognized `.env`/environment keys (§6). Unknown keys are ignored simply
/// because nothing reads them.
#[derive(Debug, Clone, Args)]
pub struct EnvConfig {
    /// Database connection URL. Required by every subcommand that touches
    /// the queue (`run-pooler`, `run-config`, and the hidden worker mode);
    /// not required by `list-formatters`/`formatter-info`.
    #[arg(long = "db-url", env = "DB_URL")]
    pub db_url: Option<String>,

    /// Path to a TOML joblist config, used as the default for `run-config`
    /// when no path is given on the command line.
    #[arg(long = "config-path", env = "CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// `tracing-subscriber` `EnvFilter` directive.
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Whether to log every SQL statement at `debug` (diesel's query target).
    #[arg(long = "log-all-sql", env = "LOG_ALL_SQL", default_value_t = false)]
    pub log_all_sql: bool,

    /// Scheduler/pool tick period, in milliseconds.
    #[arg(long = "tick-rate-ms", env = "TICK_RATE")]
    pub tick_rate_ms: Option<u64>,

    /// Worker pool ceiling (§4.4 `max_workers`).
    #[arg(long = "max-workers-per-pool", env = "MAX_WORKERS_PER_POOL")]
    pub max_workers_per_pool: Option<usize>,

    /// Worker pool floor (§4.4 `min_workers`).
    #[arg(long = "minimum-workers-per-pool", env = "MINIMUM_WORKERS_PER_POOL")]
    pub minimum_workers_per_pool: Option<usize>,

    /// `scheduler_mode` override; `run-config` normally reads this from the
    /// TOML file's `[system]` section instead.
    #[arg(long = "scheduler-mode", env = "SCHEDULER_MODE")]
    pub scheduler_mode: Option<String>,
}

impl EnvConfig {
    /// Returns `db_url`, or a `CONFIG_ERROR` (§7) if it wasn't supplied.
    pub fn require_db_url(&self) -> Result<&str> {
        self.db_url.as_deref().ok_or_else(|| {
            Error::configuration().with_message("DB_URL is required for this subcommand")
        })
    }

    /// Tick period as a [`std::time::Duration`], falling back to the
    /// ambient default.
    pub fn tick_rate(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_rate_ms.unwrap_or(DEFAULT_TICK_RATE_MS))
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers_per_pool.unwrap_or(DEFAULT_MAX_WORKERS)
    }

    pub fn min_workers(&self) -> usize {
        self.minimum_workers_per_pool.unwrap_or(DEFAULT_MIN_WORKERS)
    }
}

/// Loads a `.env` file from the current directory into the process
/// environment, if one exists. Silently a no-op when absent — `.env` is a
/// convenience, not a requirement (§6).
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(dotenvy::Error::Io(_)) => {}
        Err(err) => tracing::warn!(%err, "failed to parse .env file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(db_url: Option<&str>) -> EnvConfig {
        EnvConfig {
            db_url: db_url.map(str::to_string),
            config_path: None,
            log_level: "info".to_string(),
            log_all_sql: false,
            tick_rate_ms: None,
            max_workers_per_pool: None,
            minimum_workers_per_pool: None,
            scheduler_mode: None,
        }
    }

    #[test]
    fn missing_db_url_is_a_config_error() {
        let err = env(None).require_db_url().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn defaults_match_pool_config_defaults() {
        let cfg = env(Some("postgresql://localhost/gemforge"));
        assert_eq!(cfg.max_workers(), DEFAULT_MAX_WORKERS);
        assert_eq!(cfg.min_workers(), DEFAULT_MIN_WORKERS);
        assert_eq!(cfg.tick_rate(), std::time::Duration::from_secs(1));
    }
}
