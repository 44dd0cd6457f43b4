//! `format_tables_as_unicode`: renders markdown pipe-tables as box-drawing
//! unicode tables inside a preformatted fence (§8 scenario S4).

use std::sync::LazyLock;

use regex::Regex;

use crate::config::FormatterConfig;
use crate::flags::FormatterFlags;
use crate::plugin::{MultilineFormatter, PluginMeta};

static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());
static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").unwrap());
static SEPARATOR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|[\s:|-]+\|\s*$").unwrap());

/// Renders markdown pipe-delimited tables (`| a | b |`) as box-drawing
/// unicode tables, fenced so the output is treated as preformatted text on
/// a later pass.
pub struct TableFormatter {
    meta: PluginMeta,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            meta: PluginMeta::new("format_tables_as_unicode", "Renders markdown tables as box-drawing unicode")
                .with_priority(1),
        }
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MultilineFormatter for TableFormatter {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn start_pattern(&self) -> &Regex {
        &TABLE_ROW
    }

    fn end_pattern(&self) -> &Regex {
        &BLANK_LINE
    }

    fn apply(&self, buffer: &[String], config: &FormatterConfig, _flags: &mut FormatterFlags) -> Vec<String> {
        let rows: Vec<Vec<String>> = buffer
            .iter()
            .map(|line| line.trim_end_matches(['\n', '\r']))
            .filter(|line| !SEPARATOR_ROW.is_match(line))
            .map(split_row)
            .collect();

        if rows.is_empty() {
            return Vec::new();
        }

        let max_col_width = (config.preformatted_unicode_columns as usize).max(3);
        let mut out = vec!["```\n".to_string()];
        out.extend(render_unicode_table(&rows, max_col_width));
        out.push("```\n".to_string());
        out
    }
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn render_unicode_table(rows: &[Vec<String>], max_col_width: usize) -> Vec<String> {
    let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; ncols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count()).min(max_col_width);
        }
    }

    let border = |left: char, mid: char, right: char| -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}\n", segments.join(&mid.to_string()))
    };

    let render_row = |row: &[String]| -> String {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!(" {cell:<w$} ")
            })
            .collect();
        format!("│{}│\n", cells.join("│"))
    };

    let mut out = vec![border('┌', '┬', '┐')];
    for (i, row) in rows.iter().enumerate() {
        out.push(render_row(row));
        if i == 0 && rows.len() > 1 {
            out.push(border('├', '┼', '┤'));
        }
    }
    out.push(border('└', '┴', '┘'));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_box_drawing_between_fences() {
        let formatter = TableFormatter::new();
        let buffer = vec!["|---|---|\n".to_string(), "|1|2|\n".to_string()];
        let config = FormatterConfig::default();
        let mut flags = FormatterFlags::new();

        let out = formatter.apply(&buffer, &config, &mut flags);
        assert_eq!(out.first().unwrap(), "```\n");
        assert_eq!(out.last().unwrap(), "```\n");
        assert!(out.iter().any(|l| l.contains('┌')));
        assert!(out.iter().any(|l| l.contains('└')));
    }
}
