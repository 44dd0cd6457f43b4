//! Plugin traits: the three kinds of pluggable document transforms.

use regex::Regex;

use crate::config::FormatterConfig;
use crate::flags::FormatterFlags;

/// Priority value meaning "don't care" — sorts after every real priority.
pub const DONT_CARE_PRIORITY: u8 = 255;

/// Identity and ordering metadata shared by every plugin kind.
#[derive(Debug, Clone)]
pub struct PluginMeta {
    /// Registry key; must be unique within its kind's registry.
    pub name: String,
    /// Human-readable summary, surfaced by `formatter-info`.
    pub description: String,
    /// File extensions (without leading dot) this plugin applies to; empty
    /// means "all".
    pub valid_types: Vec<String>,
    /// Ascending sort key (0..=5 real priorities, or [`DONT_CARE_PRIORITY`]).
    pub priority: u8,
}

impl PluginMeta {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            valid_types: Vec::new(),
            priority: DONT_CARE_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_valid_types(mut self, valid_types: Vec<String>) -> Self {
        self.valid_types = valid_types;
        self
    }
}

/// A 1-line -> 1-line transform, applied to every non-preformatted line in
/// pipeline (priority) order.
///
/// Implementations MUST be idempotent on already-converted output: a given
/// document is a mix of source and previously-converted lines across
/// repeated runs.
pub trait LineFormatter: Send + Sync {
    fn meta(&self) -> &PluginMeta;

    /// Transforms one line, optionally reading/writing `flags` (e.g. to push
    /// into `buffer_until_empty_line`).
    fn apply(&self, line: &str, flags: &mut FormatterFlags) -> String;
}

/// A start/end-delimited block transform.
///
/// The pipeline buffers lines strictly between a matched `start_pattern`
/// line and the following `end_pattern` line, then calls `apply` once for
/// the whole block.
pub trait MultilineFormatter: Send + Sync {
    fn meta(&self) -> &PluginMeta;

    /// Matches the line that opens a block of this kind.
    fn start_pattern(&self) -> &Regex;

    /// Matches the line that closes an already-open block of this kind.
    fn end_pattern(&self) -> &Regex;

    /// Transforms the buffered block into zero or more output lines.
    fn apply(
        &self,
        buffer: &[String],
        config: &FormatterConfig,
        flags: &mut FormatterFlags,
    ) -> Vec<String>;
}

/// A whole-document -> whole-document transform, run before the line loop.
pub trait DocumentPreprocessor: Send + Sync {
    fn meta(&self) -> &PluginMeta;

    fn apply(&self, document: Vec<String>, config: &FormatterConfig) -> Vec<String>;
}
