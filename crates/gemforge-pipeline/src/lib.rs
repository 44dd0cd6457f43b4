#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! Stateful, plugin-composed document formatter pipeline (§4.2 of the job
//! execution core). A document is an ordered sequence of lines; a
//! [`Pipeline`] transforms it by running a registry's preprocessors, then
//! a per-line loop interleaving line formatters and multiline blocks.

/// Tracing target for pipeline formatting operations.
pub const TRACING_TARGET_PIPELINE: &str = "gemforge_pipeline";

pub mod builtin;
mod config;
mod error;
mod flags;
mod pipeline;
mod plugin;
mod registry;

pub use config::{DEFAULT_PREFORMATTED_COLUMNS, FlagValue, FormatterConfig, TrimSpec};
pub use error::{PipelineError, PipelineResult};
pub use flags::FormatterFlags;
pub use pipeline::Pipeline;
pub use plugin::{DONT_CARE_PRIORITY, DocumentPreprocessor, LineFormatter, MultilineFormatter, PluginMeta};
pub use registry::{PluginRegistry, PluginRegistryBuilder};
