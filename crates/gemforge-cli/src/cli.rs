//! Command-line surface (§6 "CLI").

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::EnvConfig;

/// Starts a worker pool, drives a one-shot scheduler, or inspects the
/// formatter plugin registry.
#[derive(Debug, Parser)]
#[command(name = "gemforge", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub env: EnvConfig,

    /// Starts an interactive debug shell on stdin alongside the
    /// subcommand's normal work (§6 "Debug shell").
    #[arg(long, global = true)]
    pub shell: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Starts a worker pool against the configured database, with no
    /// scheduler attached.
    RunPooler,

    /// Parses a TOML config into a joblist, enqueues it through a
    /// one-shot scheduler, and runs a worker pool alongside it until the
    /// queue drains.
    RunConfig {
        /// Path to the TOML config. Falls back to `--config-path`/
        /// `CONFIG_PATH` when omitted.
        path: Option<PathBuf>,
    },

    /// Prints every registered formatter plugin's name.
    ListFormatters,

    /// Prints one formatter plugin's metadata.
    FormatterInfo {
        /// Registry name of the plugin to describe.
        name: String,
    },

    /// Hidden worker-process entry point: the pooler re-execs this binary
    /// with this subcommand to spawn each worker (§4.4 "Single-process-
    /// multi-worker model"). Not intended for direct invocation.
    #[command(hide = true)]
    Worker {
        /// The worker id assigned by the pooler.
        id: String,
    },
}
