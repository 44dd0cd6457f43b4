//! [`FormatterConfig`]: the per-document settings a pipeline run is driven by.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A scalar value for a `formatter_flags` entry (`name -> scalar` map in the
/// TOML config, §6 `[defaults]`/`[file.<name>]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// A heading or footing trim specification: a match pattern, an optional
/// end pattern delimiting a multi-line span, and an offset of extra lines
/// to strip past the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimSpec {
    /// Regex identifying where the heading/footing begins.
    pub pattern: String,
    /// Regex identifying where the heading/footing ends, if it spans
    /// more than the matched line.
    pub end_pattern: Option<String>,
    /// Extra lines to strip past the matched span.
    #[serde(default)]
    pub strip_offset: usize,
}

/// Default preformatted-text column width (§6 `[defaults]` `preformatted_text_columns`).
pub const DEFAULT_PREFORMATTED_COLUMNS: u32 = 80;

/// Settings driving a single [`crate::Pipeline::format`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Plugin names enabled for this document, in configured order. The
    /// pipeline resolves each name against the registry and applies the
    /// matches in registry (priority) order, not this list's order.
    #[serde(default)]
    pub enabled_formatters: Vec<String>,
    /// Per-plugin scalar flags (`name -> value`).
    #[serde(default)]
    pub formatter_flags: HashMap<String, FlagValue>,
    /// Heading trim specification, if configured.
    #[serde(default)]
    pub heading: Option<TrimSpec>,
    /// Footing trim specification, if configured.
    #[serde(default)]
    pub footing: Option<TrimSpec>,
    /// Column width budget for preformatted (fenced) unicode blocks, e.g.
    /// tables rendered with box-drawing characters.
    #[serde(default = "default_preformatted_columns")]
    pub preformatted_unicode_columns: u32,
}

fn default_preformatted_columns() -> u32 {
    DEFAULT_PREFORMATTED_COLUMNS
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            enabled_formatters: Vec::new(),
            formatter_flags: HashMap::new(),
            heading: None,
            footing: None,
            preformatted_unicode_columns: DEFAULT_PREFORMATTED_COLUMNS,
        }
    }
}

impl FormatterConfig {
    /// Returns the flag value registered under `name`, if any.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.formatter_flags.get(name)
    }
}
