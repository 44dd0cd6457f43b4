#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! Adaptive worker process pool (§4.4). A [`pooler::Pooler`] spawns and
//! supervises a set of OS-level worker processes; each independently
//! claims and runs jobs against the queue store, coordinated only over
//! the queue itself and a tagged-variant IPC protocol ([`ipc::Message`]).

/// Tracing target for pool/worker lifecycle events.
pub const TRACING_TARGET_POOL: &str = "gemforge_pool";

mod error;
pub mod ipc;
pub mod pooler;
pub mod worker;

pub use error::{PoolError, PoolResult};
pub use pooler::{BalanceDecision, PoolConfig, Pooler, DEFAULT_REAP_AFTER_SECS, DEFAULT_TICK_RATE};
pub use worker::{WorkerConfig, DEFAULT_IDLE_PERIOD};
