#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! Typed job runners (§4.3) and the runner half of the plugin registry
//! (§4.6). A [`Runner<P>`] is bound to a `job_type` and a payload type
//! `P`; the [`RunnerRegistry`] erases `P` behind a boxed async factory so
//! callers only ever deal in `job_type` strings and [`ErasedRunner`]s.

/// Tracing target for job execution.
pub const TRACING_TARGET_JOBS: &str = "gemforge_jobs";

pub mod builtin;
mod error;
mod registry;
mod retry;
mod runner;

pub use error::{JobError, JobResult};
pub use registry::RunnerRegistry;
pub use retry::retry;
pub use runner::{DEFAULT_MAX_RETRIES, ErasedRunner, Runner, RunnerContext};
