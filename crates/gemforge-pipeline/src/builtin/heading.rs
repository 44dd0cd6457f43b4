//! `strip_heading_footing`: a document preprocessor that trims a
//! configured heading and/or footing span off a document.

use regex::Regex;

use crate::config::{FormatterConfig, TrimSpec};
use crate::plugin::{DocumentPreprocessor, PluginMeta};

/// Removes a leading/trailing span of lines identified by `config.heading`
/// and `config.footing` (§3 `FormatterJobPayload`: "heading/footing and
/// their match-patterns and offsets").
pub struct StripHeadingFooting {
    meta: PluginMeta,
}

impl StripHeadingFooting {
    pub fn new() -> Self {
        Self {
            meta: PluginMeta::new("strip_heading_footing", "Strips a configured heading/footing span")
                .with_priority(0),
        }
    }
}

impl Default for StripHeadingFooting {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPreprocessor for StripHeadingFooting {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn apply(&self, document: Vec<String>, config: &FormatterConfig) -> Vec<String> {
        let mut lines = document;

        if let Some(heading) = &config.heading {
            lines = strip_leading_span(lines, heading);
        }
        if let Some(footing) = &config.footing {
            lines = strip_trailing_span(lines, footing);
        }

        lines
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .inspect_err(|err| tracing::warn!(pattern, %err, "invalid heading/footing pattern, ignoring"))
        .ok()
}

fn bare(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn strip_leading_span(lines: Vec<String>, spec: &TrimSpec) -> Vec<String> {
    let Some(start_pattern) = compile(&spec.pattern) else {
        return lines;
    };

    let Some(start) = lines.iter().position(|line| start_pattern.is_match(bare(line))) else {
        return lines;
    };

    let end = match &spec.end_pattern {
        Some(pattern) => compile(pattern)
            .and_then(|re| lines[start..].iter().position(|line| re.is_match(bare(line))))
            .map(|offset| start + offset)
            .unwrap_or(start),
        None => start,
    };

    let cut = (end + spec.strip_offset + 1).min(lines.len());
    lines.into_iter().skip(cut).collect()
}

fn strip_trailing_span(lines: Vec<String>, spec: &TrimSpec) -> Vec<String> {
    let Some(end_pattern) = compile(&spec.pattern) else {
        return lines;
    };

    let Some(end_from_back) = lines.iter().rev().position(|line| end_pattern.is_match(bare(line))) else {
        return lines;
    };
    let end = lines.len() - 1 - end_from_back;

    let start = match &spec.end_pattern {
        Some(pattern) => compile(pattern)
            .and_then(|re| lines[..=end].iter().rev().position(|line| re.is_match(bare(line))))
            .map(|offset_from_end| end - offset_from_end)
            .unwrap_or(end),
        None => end,
    };

    let keep_until = start.saturating_sub(spec.strip_offset);
    lines.into_iter().take(keep_until).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| format!("{s}\n")).collect()
    }

    #[test]
    fn strips_leading_heading_line() {
        let preprocessor = StripHeadingFooting::new();
        let config = FormatterConfig {
            heading: Some(TrimSpec {
                pattern: "^# Title$".to_string(),
                end_pattern: None,
                strip_offset: 0,
            }),
            ..Default::default()
        };

        let input = doc(&["# Title", "body line"]);
        let out = preprocessor.apply(input, &config);
        assert_eq!(out, doc(&["body line"]));
    }

    #[test]
    fn strips_trailing_footing_line() {
        let preprocessor = StripHeadingFooting::new();
        let config = FormatterConfig {
            footing: Some(TrimSpec {
                pattern: "^-- $".to_string(),
                end_pattern: None,
                strip_offset: 0,
            }),
            ..Default::default()
        };

        let input = doc(&["body line", "-- "]);
        let out = preprocessor.apply(input, &config);
        assert_eq!(out, doc(&["body line"]));
    }

    #[test]
    fn no_heading_configured_is_identity() {
        let preprocessor = StripHeadingFooting::new();
        let config = FormatterConfig::default();
        let input = doc(&["a", "b"]);
        let out = preprocessor.apply(input.clone(), &config);
        assert_eq!(out, input);
    }
}
