//! Error types for the formatter pipeline.

use thiserror::Error;

/// Errors raised while formatting a document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input or output path missing from a job payload (§4.2 `CONFIG_ERROR`).
    #[error("formatter config error: {0}")]
    Config(String),

    /// A plugin's `apply` panicked or returned an error; the whole document
    /// is treated as failed (§7: "a plugin raising during apply fails the
    /// whole document").
    #[error("plugin '{plugin}' failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: gemforge_core::BoxedError,
    },

    /// Underlying I/O failure reading or writing a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized [`Result`] type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
