//! Built-in job runners.

mod formatter;

pub use formatter::{FormatterJobPayload, FormatterRunner, JOB_TYPE as FORMATTER_JOB_TYPE};

use crate::registry::RunnerRegistry;

/// Registers every built-in runner onto a [`RunnerRegistry`].
pub fn register_all(registry: &mut RunnerRegistry) {
    registry.register::<FormatterJobPayload, FormatterRunner>(FORMATTER_JOB_TYPE);
}
