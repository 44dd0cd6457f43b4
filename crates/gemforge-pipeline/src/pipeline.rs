//! [`Pipeline`]: the stateful, per-document formatter run.

use crate::config::FormatterConfig;
use crate::flags::FormatterFlags;
use crate::registry::PluginRegistry;

const PREFORMAT_FENCE: &str = "```";

/// Runs documents through a [`PluginRegistry`]'s plugins in the stage order
/// from §4.2: preprocess, then a per-line loop that interleaves line
/// formatters, buffer flushing, and multiline block detection.
pub struct Pipeline<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Formats `document` (an ordered sequence of lines) per `config`.
    ///
    /// Named plugins that aren't registered under any kind are logged as a
    /// warning and skipped — not a fatal error.
    pub fn format(&self, document: Vec<String>, config: &FormatterConfig) -> Vec<String> {
        for unknown in self.registry.unknown_names(&config.enabled_formatters) {
            tracing::warn!(plugin = unknown, "enabled formatter not found in registry, skipping");
        }

        let mut doc = document;
        for preprocessor in self
            .registry
            .enabled_preprocessors(&config.enabled_formatters)
        {
            doc = preprocessor.apply(doc, config);
        }

        let line_formatters = self
            .registry
            .enabled_line_formatters(&config.enabled_formatters);
        let multiline_formatters = self
            .registry
            .enabled_multiline_formatters(&config.enabled_formatters);

        let mut flags = FormatterFlags::new();
        let mut output = Vec::with_capacity(doc.len());

        for raw_line in doc {
            let mut line = raw_line;

            if line.trim_start().starts_with(PREFORMAT_FENCE) {
                flags.in_preformat = !flags.in_preformat;
            }

            for formatter in &line_formatters {
                line = formatter.apply(&line, &mut flags);
            }

            if line.trim().is_empty() && !flags.buffer_until_empty_line.is_empty() {
                output.append(&mut flags.buffer_until_empty_line);
            }

            let mut entered_multiline_here = false;
            if !flags.in_multiline {
                for formatter in &multiline_formatters {
                    if formatter.start_pattern().is_match(&line) {
                        flags.in_multiline = true;
                        flags.active_multiline_formatter = Some(formatter.meta().name.clone());
                        entered_multiline_here = true;
                        break;
                    }
                }
            }

            if flags.in_multiline {
                if entered_multiline_here {
                    // The line that matched start_pattern is itself the
                    // first line of the block's content (span
                    // lines[i..j-1]), not consumed by the transition.
                    flags.multiline_buffer.push(line);
                    continue;
                }

                let active = flags.active_multiline_formatter.clone();
                let formatter = active
                    .as_deref()
                    .and_then(|name| self.registry.multiline_formatter(name));

                match formatter {
                    Some(formatter) if formatter.end_pattern().is_match(&line) => {
                        let buffer = std::mem::take(&mut flags.multiline_buffer);
                        output.extend(formatter.apply(&buffer, config, &mut flags));
                        flags.in_multiline = false;
                        flags.active_multiline_formatter = None;
                    }
                    Some(_) => flags.multiline_buffer.push(line),
                    // The active formatter vanished from the registry between
                    // the start match and now; treat the rest as plain text.
                    None => {
                        flags.in_multiline = false;
                        flags.active_multiline_formatter = None;
                        output.push(line);
                    }
                }
            } else {
                output.push(line);
            }
        }

        // An unmatched block (start with no end before EOF) or trailing
        // buffered lines leave their buffers unflushed; flush both at EOF
        // rather than silently dropping them (§4.2).
        if !flags.multiline_buffer.is_empty() {
            output.append(&mut flags.multiline_buffer);
        }
        if !flags.buffer_until_empty_line.is_empty() {
            output.append(&mut flags.buffer_until_empty_line);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regex::Regex;

    use super::*;
    use crate::plugin::{DocumentPreprocessor, LineFormatter, MultilineFormatter, PluginMeta};

    #[test]
    fn empty_formatter_set_is_identity() {
        let registry = PluginRegistry::new();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig::default();

        let doc = vec!["hello\n".to_string()];
        let out = pipeline.format(doc.clone(), &config);
        assert_eq!(out, doc);
    }

    struct Upper(PluginMeta);
    impl LineFormatter for Upper {
        fn meta(&self) -> &PluginMeta {
            &self.0
        }
        fn apply(&self, line: &str, _flags: &mut FormatterFlags) -> String {
            line.to_uppercase()
        }
    }

    #[test]
    fn line_formatter_applies_to_every_line() {
        let plugin = Arc::new(Upper(PluginMeta::new("upper", "uppercases lines")));
        let registry = PluginRegistry::builder().line_formatter(plugin).build();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig {
            enabled_formatters: vec!["upper".to_string()],
            ..Default::default()
        };

        let out = pipeline.format(vec!["hi\n".to_string()], &config);
        assert_eq!(out, vec!["HI\n".to_string()]);
    }

    struct Block(PluginMeta, Regex, Regex);
    impl MultilineFormatter for Block {
        fn meta(&self) -> &PluginMeta {
            &self.0
        }
        fn start_pattern(&self) -> &Regex {
            &self.1
        }
        fn end_pattern(&self) -> &Regex {
            &self.2
        }
        fn apply(&self, buffer: &[String], _config: &FormatterConfig, _flags: &mut FormatterFlags) -> Vec<String> {
            vec![format!("[{}]\n", buffer.len())]
        }
    }

    #[test]
    fn multiline_block_includes_start_line_excludes_end_line() {
        let plugin = Arc::new(Block(
            PluginMeta::new("block", "test block"),
            Regex::new("^START$").unwrap(),
            Regex::new("^END$").unwrap(),
        ));
        let registry = PluginRegistry::builder()
            .multiline_formatter(plugin)
            .build();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig {
            enabled_formatters: vec!["block".to_string()],
            ..Default::default()
        };

        let doc = vec![
            "before\n".to_string(),
            "START\n".to_string(),
            "inner1\n".to_string(),
            "inner2\n".to_string(),
            "END\n".to_string(),
            "after\n".to_string(),
        ];
        let out = pipeline.format(doc, &config);
        assert_eq!(
            out,
            vec![
                "before\n".to_string(),
                "[3]\n".to_string(),
                "after\n".to_string(),
            ]
        );
    }

    #[test]
    fn unmatched_multiline_start_flushes_at_eof() {
        let plugin = Arc::new(Block(
            PluginMeta::new("block", "test block"),
            Regex::new("^START$").unwrap(),
            Regex::new("^END$").unwrap(),
        ));
        let registry = PluginRegistry::builder()
            .multiline_formatter(plugin)
            .build();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig {
            enabled_formatters: vec!["block".to_string()],
            ..Default::default()
        };

        let doc = vec![
            "before\n".to_string(),
            "START\n".to_string(),
            "inner1\n".to_string(),
        ];
        let out = pipeline.format(doc, &config);
        assert_eq!(
            out,
            vec!["before\n".to_string(), "START\n".to_string(), "inner1\n".to_string()]
        );
    }

    #[test]
    fn s4_table_block_renders_unicode_box_with_header() {
        use crate::builtin::TableFormatter;

        let plugin = Arc::new(TableFormatter::new());
        let registry = PluginRegistry::builder()
            .multiline_formatter(plugin)
            .build();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig {
            enabled_formatters: vec!["format_tables_as_unicode".to_string()],
            ..Default::default()
        };

        let doc = vec![
            "|a|b|\n".to_string(),
            "|---|---|\n".to_string(),
            "|1|2|\n".to_string(),
            "\n".to_string(),
        ];
        let out = pipeline.format(doc, &config);

        assert_eq!(out.first().unwrap(), "```\n");
        assert_eq!(out.last().unwrap(), "```\n");
        assert!(out.iter().any(|l| l.contains('┌')));
        assert!(out.iter().any(|l| l.contains('└')));
        // The header row must survive into the rendered table, not be
        // dropped or leaked through as a raw pipe-table line.
        assert!(out.iter().any(|l| l.contains('a') && l.contains('b')));
        assert!(!out.iter().any(|l| l.trim_start().starts_with('|')));
    }

    struct NoOpPre(PluginMeta);
    impl DocumentPreprocessor for NoOpPre {
        fn meta(&self) -> &PluginMeta {
            &self.0
        }
        fn apply(&self, document: Vec<String>, _config: &FormatterConfig) -> Vec<String> {
            document
        }
    }

    #[test]
    fn unknown_plugin_name_is_skipped_not_fatal() {
        let plugin = Arc::new(NoOpPre(PluginMeta::new("noop", "does nothing")));
        let registry = PluginRegistry::builder().preprocessor(plugin).build();
        let pipeline = Pipeline::new(&registry);
        let config = FormatterConfig {
            enabled_formatters: vec!["noop".to_string(), "does_not_exist".to_string()],
            ..Default::default()
        };

        let out = pipeline.format(vec!["x\n".to_string()], &config);
        assert_eq!(out, vec!["x\n".to_string()]);
    }
}
