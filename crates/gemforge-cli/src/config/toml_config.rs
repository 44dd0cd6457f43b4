//! TOML joblist configuration (§6 "Configuration file (TOML)"): parses a
//! `[system]`/`[defaults]`/`[file.<name>]`/`[dir.<name>]` document and lowers
//! it into the `Vec<NewJobRow>` a `run-config` invocation enqueues.

use std::collections::HashMap;
use std::path::PathBuf;

use gemforge_core::{Error, Result};
use gemforge_jobs::builtin::{FORMATTER_JOB_TYPE, FormatterJobPayload};
use gemforge_pipeline::{DEFAULT_PREFORMATTED_COLUMNS, FlagValue, TrimSpec};
use gemforge_postgres::NewJobRow;
use serde::Deserialize;

/// Default job priority for rows lowered from a TOML config; the scheduler
/// doesn't otherwise distinguish between jobs it enqueues.
const DEFAULT_PRIORITY: i32 = 0;

/// The full TOML document (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub system: SystemSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default, rename = "file")]
    pub files: HashMap<String, FileSection>,
    #[serde(default, rename = "dir")]
    pub dirs: HashMap<String, DirSection>,
}

/// `[system]`: process-wide settings (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct SystemSection {
    pub scheduler_mode: String,
}

/// `[defaults]`: values every `[file.*]`/`[dir.*]` section inherits unless
/// it overrides them (§6).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub formatters: Vec<String>,
    #[serde(default)]
    pub formatter_flags: HashMap<String, FlagValue>,
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_columns")]
    pub preformatted_text_columns: u32,
    pub interval: Option<u64>,
}

fn default_columns() -> u32 {
    DEFAULT_PREFORMATTED_COLUMNS
}

/// `[file.<name>]`: a single-document job (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct FileSection {
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub formatters: Vec<String>,
    #[serde(default)]
    pub formatter_blacklist: Vec<String>,
    #[serde(default)]
    pub formatter_flags: HashMap<String, FlagValue>,
    pub preformatted_text_columns: Option<u32>,
    pub heading: Option<String>,
    pub heading_end_pattern: Option<String>,
    #[serde(default)]
    pub heading_strip_offset: usize,
    pub footing: Option<String>,
    pub footing_end_pattern: Option<String>,
    #[serde(default)]
    pub footing_strip_offset: usize,
    pub interval: Option<u64>,
}

/// `[dir.<name>]`: the same keys as `[file.<name>]`, plus `recursive` (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct DirSection {
    #[serde(flatten)]
    pub file: FileSection,
    #[serde(default)]
    pub recursive: bool,
}

impl AppConfig {
    /// Parses and validates a TOML document. `CONFIG_ERROR` (§7) on a
    /// malformed document, an unrecognized `scheduler_mode`, or any
    /// section missing `input_path`.
    pub fn parse(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)
            .map_err(|err| Error::configuration().with_message(err.to_string()).with_source(err))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if gemforge_scheduler::select_mode(&self.system.scheduler_mode).is_none() {
            return Err(Error::configuration().with_message(format!(
                "[system].scheduler_mode must be 'oneshot' or 'cron', got '{}'",
                self.system.scheduler_mode
            )));
        }

        for (name, file) in &self.files {
            if file.input_path.is_none() {
                return Err(Error::configuration()
                    .with_message(format!("[file.{name}] is missing input_path")));
            }
        }
        for (name, dir) in &self.dirs {
            if dir.file.input_path.is_none() {
                return Err(Error::configuration()
                    .with_message(format!("[dir.{name}] is missing input_path")));
            }
        }
        Ok(())
    }

    /// Lowers every `[file.*]`/`[dir.*]` section into a pending
    /// `formatter` job row, in no particular cross-section order (§6).
    pub fn into_jobs(self) -> Result<Vec<NewJobRow>> {
        let mut jobs = Vec::with_capacity(self.files.len() + self.dirs.len());

        for (name, file) in &self.files {
            jobs.push(lower(name, &self.defaults, file, false, false)?);
        }
        for (name, dir) in &self.dirs {
            jobs.push(lower(name, &self.defaults, &dir.file, true, dir.recursive)?);
        }

        Ok(jobs)
    }
}

/// Final enabled formatters for a section: `(defaults ∪ section) \
/// blacklist`, preserving order — defaults first, then section-specific,
/// with blacklisted names dropped from either (§6).
fn enabled_formatters(defaults: &DefaultsSection, section: &FileSection) -> Vec<String> {
    defaults
        .formatters
        .iter()
        .chain(section.formatters.iter())
        .filter(|name| !section.formatter_blacklist.contains(name))
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(name) {
                acc.push(name.clone());
            }
            acc
        })
}

fn merged_flags(
    defaults: &DefaultsSection,
    section: &FileSection,
) -> HashMap<String, FlagValue> {
    let mut flags = defaults.formatter_flags.clone();
    flags.extend(section.formatter_flags.clone());
    flags
}

fn trim_spec(pattern: Option<&String>, end_pattern: Option<&String>, strip_offset: usize) -> Option<TrimSpec> {
    pattern.map(|pattern| TrimSpec {
        pattern: pattern.clone(),
        end_pattern: end_pattern.cloned(),
        strip_offset,
    })
}

fn lower(
    name: &str,
    defaults: &DefaultsSection,
    section: &FileSection,
    is_dir: bool,
    is_recursive: bool,
) -> Result<NewJobRow> {
    let input_path = section
        .input_path
        .clone()
        .ok_or_else(|| Error::configuration().with_message(format!("[{name}] is missing input_path")))?;

    let payload = FormatterJobPayload {
        jobname: name.to_string(),
        input_path,
        output_path: section.output_path.clone().or_else(|| defaults.output_path.clone()),
        is_dir,
        is_recursive,
        enabled_formatters: enabled_formatters(defaults, section),
        formatter_flags: merged_flags(defaults, section),
        heading: trim_spec(section.heading.as_ref(), section.heading_end_pattern.as_ref(), section.heading_strip_offset),
        footing: trim_spec(section.footing.as_ref(), section.footing_end_pattern.as_ref(), section.footing_strip_offset),
        preformatted_unicode_columns: section
            .preformatted_text_columns
            .unwrap_or(defaults.preformatted_text_columns),
    };

    let config_blob = serde_json::to_string(&payload)
        .map_err(|err| Error::serialization().with_message(err.to_string()).with_source(err))?;

    Ok(NewJobRow::new(name, FORMATTER_JOB_TYPE, config_blob, DEFAULT_PRIORITY))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[system]
scheduler_mode = "oneshot"

[defaults]
formatters = ["trim_trailing_whitespace", "strip_heading_footing"]
preformatted_text_columns = 100

[file.readme]
input_path = "/docs/readme.md"
formatter_blacklist = ["strip_heading_footing"]

[dir.reports]
input_path = "/docs/reports"
recursive = true
formatters = ["format_tables_as_unicode"]
"#;

    #[test]
    fn parses_and_lowers_into_jobs() {
        let config = AppConfig::parse(CONFIG).expect("valid config");
        let jobs = config.into_jobs().expect("lowers cleanly");
        assert_eq!(jobs.len(), 2);

        let readme = jobs.iter().find(|j| j.name == "readme").unwrap();
        let payload: FormatterJobPayload = serde_json::from_str(&readme.config_blob).unwrap();
        assert_eq!(payload.enabled_formatters, vec!["trim_trailing_whitespace".to_string()]);
        assert_eq!(payload.preformatted_unicode_columns, 100);
        assert!(!payload.is_dir);

        let reports = jobs.iter().find(|j| j.name == "reports").unwrap();
        let payload: FormatterJobPayload = serde_json::from_str(&reports.config_blob).unwrap();
        assert!(payload.is_dir);
        assert!(payload.is_recursive);
        assert_eq!(
            payload.enabled_formatters,
            vec![
                "trim_trailing_whitespace".to_string(),
                "strip_heading_footing".to_string(),
                "format_tables_as_unicode".to_string(),
            ]
        );
    }

    #[test]
    fn missing_input_path_is_a_config_error() {
        let config = r#"
[system]
scheduler_mode = "oneshot"

[file.broken]
formatters = []
"#;
        assert!(AppConfig::parse(config).is_err());
    }

    #[test]
    fn unrecognized_scheduler_mode_is_a_config_error() {
        let config = r#"
[system]
scheduler_mode = "weekly"
"#;
        assert!(AppConfig::parse(config).is_err());
    }
}
