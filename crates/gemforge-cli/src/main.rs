#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod bootstrap;
mod cli;
mod config;
mod shell;
mod signals;
mod telemetry;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};

use anyhow::Context;
use clap::Parser;
use config::{AppConfig, EnvConfig};
use gemforge_pool::{PoolConfig, Pooler, WorkerConfig};
use gemforge_scheduler::{CronScheduler, OneShotScheduler, RunnerConfig, Scheduler, SchedulerMode, SchedulerRunner};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.env.log_level);

    let result = match cli.command {
        Command::RunPooler => run_pooler(&cli.env, cli.shell).await,
        Command::RunConfig { path } => run_config(&cli.env, path, cli.shell).await,
        Command::ListFormatters => list_formatters(),
        Command::FormatterInfo { name } => formatter_info(&name),
        Command::Worker { id } => run_worker(&cli.env, id).await,
    };

    match result {
        Ok(()) => {
            tracing::info!("gemforge terminated successfully");
            process::exit(0);
        }
        Err(err) => {
            if tracing::enabled!(tracing::Level::ERROR) {
                tracing::error!(error = %err, "gemforge terminated with error");
            } else {
                eprintln!("Error: {err:#}");
            }
            process::exit(1);
        }
    }
}

/// `run-pooler`: starts a worker pool against the configured database,
/// with no scheduler attached (§6).
async fn run_pooler(env: &EnvConfig, shell: bool) -> anyhow::Result<()> {
    let db_url = env.require_db_url()?.to_string();
    let queue = bootstrap::connect(&db_url).await?;
    let command_factory = bootstrap::worker_command_factory(db_url)?;

    let pool_config = PoolConfig {
        min_workers: env.min_workers(),
        max_workers: env.max_workers(),
        tick_rate: env.tick_rate(),
        ..PoolConfig::default()
    };
    let size_gauge = Arc::new(AtomicUsize::new(0));
    let mut pooler = Pooler::new(queue.clone(), pool_config, command_factory).with_size_gauge(size_gauge.clone());

    let running = Arc::new(AtomicBool::new(true));
    signals::install(running.clone());

    if shell {
        tokio::spawn(shell::run(queue.clone(), size_gauge));
    }

    pooler.run(running).await?;
    Ok(())
}

/// `run-config <path>`: parses a TOML joblist, drives a `OneShotScheduler`
/// (or `CronScheduler`, per `[system].scheduler_mode`), and runs a worker
/// pool alongside it until the run's `running` flag clears (§6, §4.5).
async fn run_config(env: &EnvConfig, path: Option<PathBuf>, shell: bool) -> anyhow::Result<()> {
    let path = path
        .or_else(|| env.config_path.clone())
        .context("no config path given: pass one, or set --config-path/CONFIG_PATH")?;

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let config = AppConfig::parse(&text)?;
    let mode = gemforge_scheduler::select_mode(&config.system.scheduler_mode)
        .context("unrecognized scheduler_mode")?;
    let jobs = config.into_jobs()?;

    let db_url = env.require_db_url()?.to_string();
    let queue = bootstrap::connect(&db_url).await?;
    let command_factory = bootstrap::worker_command_factory(db_url)?;

    let running = Arc::new(AtomicBool::new(true));
    signals::install(running.clone());

    let pool_config = PoolConfig {
        min_workers: env.min_workers(),
        max_workers: env.max_workers(),
        tick_rate: env.tick_rate(),
        ..PoolConfig::default()
    };
    let size_gauge = Arc::new(AtomicUsize::new(0));
    let mut pooler = Pooler::new(queue.clone(), pool_config, command_factory).with_size_gauge(size_gauge.clone());

    let scheduler: Box<dyn Scheduler> = match mode {
        SchedulerMode::OneShot => Box::new(OneShotScheduler::new(queue.clone(), jobs, running.clone())),
        SchedulerMode::Cron => Box::new(CronScheduler::new(queue.clone())),
    };
    let mut runner = SchedulerRunner::new(scheduler, queue.clone(), RunnerConfig::default(), running.clone());

    if shell {
        tokio::spawn(shell::run(queue.clone(), size_gauge));
    }

    let (pool_result, scheduler_result) = tokio::join!(pooler.run(running.clone()), runner.run());
    pool_result?;
    scheduler_result?;
    Ok(())
}

/// Hidden worker-process entry point (§4.4): claims and executes jobs
/// against the queue, communicating with the pooler over its own stdin/
/// stdout.
async fn run_worker(env: &EnvConfig, id: String) -> anyhow::Result<()> {
    let db_url = env.require_db_url()?.to_string();
    let queue = bootstrap::connect(&db_url).await?;
    let runners = bootstrap::runner_registry();
    let formatters = bootstrap::plugin_registry();

    gemforge_pool::worker::run(
        id,
        queue,
        runners,
        formatters,
        WorkerConfig::default(),
        tokio::io::stdin(),
        tokio::io::stdout(),
    )
    .await?;
    Ok(())
}

/// `list-formatters`: prints every registered plugin's name and
/// description (§6).
fn list_formatters() -> anyhow::Result<()> {
    let registry = bootstrap::plugin_registry();
    for meta in registry.all_meta() {
        println!("{:<32} {}", meta.name, meta.description);
    }
    Ok(())
}

/// `formatter-info <name>`: prints one plugin's full metadata (§6).
fn formatter_info(name: &str) -> anyhow::Result<()> {
    let registry = bootstrap::plugin_registry();
    let meta = registry
        .meta(name)
        .with_context(|| format!("no formatter named '{name}'"))?;

    println!("name: {}", meta.name);
    println!("description: {}", meta.description);
    println!("priority: {}", meta.priority);
    println!(
        "valid_types: {}",
        if meta.valid_types.is_empty() {
            "all".to_string()
        } else {
            meta.valid_types.join(", ")
        }
    );
    Ok(())
}
