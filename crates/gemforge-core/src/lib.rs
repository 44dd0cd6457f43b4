#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! Shared error types, tracing targets, and small ambient types reused by
//! every other `gemforge-*` crate: the queue store, the formatter pipeline,
//! job runners, the worker pool, and the scheduler.

pub mod common;
pub mod error;

#[doc(hidden)]
pub mod prelude;

pub use common::{Provider, ServiceHealth, ServiceStatus, Timing};
pub use error::{BoxedError, Error, ErrorKind, Result};
