//! Enqueues jobs per a scheduling mode, observes their completion, and owns
//! a run's lifecycle (§4.5).
//!
//! [`Scheduler`] is the trait every mode implements; [`OneShotScheduler`]
//! and [`CronScheduler`] are the two concrete modes selected via
//! [`select_mode`]; [`SchedulerRunner`] drives whichever mode was selected
//! through its tick loop and runs the periodic garbage collector alongside
//! it.

mod cron;
mod error;
mod mode;
mod oneshot;
mod runner;
mod scheduler;

pub use cron::CronScheduler;
pub use error::{SchedulerError, SchedulerResult};
pub use mode::{SchedulerMode, select_mode};
pub use oneshot::OneShotScheduler;
pub use runner::{DEFAULT_GC_PERIOD, DEFAULT_TICK_RATE, RunnerConfig, SchedulerRunner};
pub use scheduler::Scheduler;

/// Tracing target for scheduler-emitted events, mirrored from the other
/// gemforge crates' `TRACING_TARGET_*` convention.
pub const TRACING_TARGET_SCHEDULER: &str = "gemforge_scheduler";
