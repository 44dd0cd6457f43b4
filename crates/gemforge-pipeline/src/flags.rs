//! [`FormatterFlags`]: per-document mutable pipeline state.

/// Mutable state threaded through a single document's pass over the
/// pipeline. Created fresh per document; never shared across documents.
#[derive(Debug, Clone, Default)]
pub struct FormatterFlags {
    /// Toggled by triple-backtick fences; plugins consult this to avoid
    /// corrupting preformatted text.
    pub in_preformat: bool,
    /// Set while a multiline block is open.
    pub in_multiline: bool,
    /// Name of the multiline formatter currently consuming lines, if any.
    pub active_multiline_formatter: Option<String>,
    /// Lines buffered since the last blank line, flushed when one is seen.
    pub buffer_until_empty_line: Vec<String>,
    /// Lines accumulated for the currently open multiline block, including
    /// the line that matched its `start_pattern`. Kept separate from
    /// `buffer_until_empty_line`: a multiline formatter's `end_pattern` may
    /// itself be a blank line (e.g. `format_tables_as_unicode`), and the two
    /// buffers must not collide when that happens.
    pub multiline_buffer: Vec<String>,
}

impl FormatterFlags {
    /// Creates fresh, all-default flags for a new document.
    pub fn new() -> Self {
        Self::default()
    }
}
