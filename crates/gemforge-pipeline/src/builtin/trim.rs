//! `trim_trailing_whitespace`: a line formatter that strips trailing
//! horizontal whitespace, honoring `in_preformat`.

use crate::flags::FormatterFlags;
use crate::plugin::{LineFormatter, PluginMeta};

/// Strips trailing spaces/tabs from each line, skipping lines inside a
/// preformatted (fenced) block so code samples are left untouched.
pub struct TrimTrailingWhitespace {
    meta: PluginMeta,
}

impl TrimTrailingWhitespace {
    pub fn new() -> Self {
        Self {
            meta: PluginMeta::new("trim_trailing_whitespace", "Strips trailing horizontal whitespace")
                .with_priority(0),
        }
    }
}

impl Default for TrimTrailingWhitespace {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFormatter for TrimTrailingWhitespace {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn apply(&self, line: &str, flags: &mut FormatterFlags) -> String {
        if flags.in_preformat {
            return line.to_string();
        }

        let ending = if line.ends_with("\r\n") {
            "\r\n"
        } else if line.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        let body = line.strip_suffix(ending).unwrap_or(line);
        format!("{}{ending}", body.trim_end_matches([' ', '\t']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_spaces_outside_preformat() {
        let formatter = TrimTrailingWhitespace::new();
        let mut flags = FormatterFlags::new();
        assert_eq!(formatter.apply("hello   \n", &mut flags), "hello\n");
    }

    #[test]
    fn leaves_preformatted_lines_untouched() {
        let formatter = TrimTrailingWhitespace::new();
        let mut flags = FormatterFlags::new();
        flags.in_preformat = true;
        assert_eq!(formatter.apply("code   \n", &mut flags), "code   \n");
    }
}
