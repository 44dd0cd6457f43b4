//! Commonly used items from gemforge-core.
//!
//! This prelude module exports the most commonly used types to simplify
//! imports in consuming crates.

pub use crate::common::{Provider, ServiceHealth, ServiceStatus, Timing};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
