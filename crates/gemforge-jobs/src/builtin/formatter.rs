//! The built-in `formatter` runner (§4.3): converts a single file through
//! the formatter pipeline, or fans a directory job out into one child row
//! per matched file.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use gemforge_pipeline::{FlagValue, FormatterConfig, Pipeline, TrimSpec};
use gemforge_postgres::{JobRow, NewJobRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{JobError, JobResult};
use crate::runner::{Runner, RunnerContext};

/// `job_type` string the runner is registered under.
pub const JOB_TYPE: &str = "formatter";

/// Glob pattern matching formattable documents in a directory job.
const MATCH_GLOB: &str = "*.md*";
const MATCH_GLOB_RECURSIVE: &str = "**/*.md*";

/// The deserialized contents of `config_blob` for a `formatter` job (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterJobPayload {
    pub jobname: String,
    pub input_path: PathBuf,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub is_recursive: bool,
    #[serde(default)]
    pub enabled_formatters: Vec<String>,
    #[serde(default)]
    pub formatter_flags: HashMap<String, FlagValue>,
    #[serde(default)]
    pub heading: Option<TrimSpec>,
    #[serde(default)]
    pub footing: Option<TrimSpec>,
    #[serde(default = "default_preformatted_columns")]
    pub preformatted_unicode_columns: u32,
}

fn default_preformatted_columns() -> u32 {
    gemforge_pipeline::DEFAULT_PREFORMATTED_COLUMNS
}

impl FormatterJobPayload {
    fn pipeline_config(&self) -> FormatterConfig {
        FormatterConfig {
            enabled_formatters: self.enabled_formatters.clone(),
            formatter_flags: self.formatter_flags.clone(),
            heading: self.heading.clone(),
            footing: self.footing.clone(),
            preformatted_unicode_columns: self.preformatted_unicode_columns,
        }
    }

    /// Builds the single-file child payload for one fan-out match.
    fn child_for(&self, matched: PathBuf, output_dir: &std::path::Path) -> Self {
        let stem = matched
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        Self {
            jobname: format!("{}/{stem}", self.jobname),
            output_path: Some(output_dir.join(format!("{stem}.gmi"))),
            input_path: matched,
            is_dir: false,
            is_recursive: false,
            enabled_formatters: self.enabled_formatters.clone(),
            formatter_flags: self.formatter_flags.clone(),
            heading: self.heading.clone(),
            footing: self.footing.clone(),
            preformatted_unicode_columns: self.preformatted_unicode_columns,
        }
    }
}

/// Converts a single document, or fans a directory out into per-file rows.
pub struct FormatterRunner {
    job_id: Uuid,
    job_type: String,
    priority: i32,
    payload: FormatterJobPayload,
    ctx: RunnerContext,
}

#[async_trait]
impl Runner<FormatterJobPayload> for FormatterRunner {
    async fn construct(job: JobRow, payload: FormatterJobPayload, ctx: RunnerContext) -> JobResult<Self> {
        Ok(Self {
            job_id: job.id,
            job_type: job.job_type,
            priority: job.priority,
            payload,
            ctx,
        })
    }

    async fn run(&mut self) -> JobResult<()> {
        if self.payload.is_dir {
            self.fan_out().await?;
            self.ctx.queue.mark_completed(self.job_id).await?;
            return Ok(());
        }

        match self.convert_single_file().await {
            Ok(()) => self.ctx.queue.mark_completed(self.job_id).await?,
            Err(err) => {
                tracing::warn!(job_id = %self.job_id, %err, "formatter job failed");
                self.ctx.queue.mark_failed(self.job_id).await?;
            }
        }
        Ok(())
    }
}

impl FormatterRunner {
    async fn fan_out(&self) -> JobResult<()> {
        let output_dir = self
            .payload
            .output_path
            .clone()
            .unwrap_or_else(|| self.payload.input_path.clone());

        let pattern_dir = self.payload.input_path.to_string_lossy();
        let pattern = if self.payload.is_recursive {
            format!("{pattern_dir}/{MATCH_GLOB_RECURSIVE}")
        } else {
            format!("{pattern_dir}/{MATCH_GLOB}")
        };

        let matches = glob::glob(&pattern)
            .map_err(|err| JobError::InvalidPayload(format!("bad glob pattern: {err}")))?;

        let mut enqueued = 0u32;
        for entry in matches {
            let path = match entry {
                Ok(path) if path.is_file() => path,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable path during formatter fan-out");
                    continue;
                }
            };

            let child = self.payload.child_for(path, &output_dir);
            let config_blob = serde_json::to_string(&child)
                .map_err(|err| JobError::InvalidPayload(err.to_string()))?;
            let row = NewJobRow::new(child.jobname.clone(), self.job_type.clone(), config_blob, self.priority);
            self.ctx.queue.add(row).await?;
            enqueued += 1;
        }

        tracing::debug!(job_id = %self.job_id, enqueued, "formatter directory job fanned out");
        Ok(())
    }

    async fn convert_single_file(&self) -> JobResult<()> {
        let output_path = self.payload.output_path.as_ref().ok_or_else(|| {
            JobError::InvalidPayload("formatter job is missing output_path".to_string())
        })?;

        let content = tokio::fs::read_to_string(&self.payload.input_path).await?;
        let document = split_keep_newlines(&content);

        let registry = self.ctx.formatters.clone();
        let pipeline = Pipeline::new(&registry);
        let config = self.payload.pipeline_config();
        let formatted = pipeline.format(document, &config);

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, formatted.concat()).await?;
        Ok(())
    }
}

fn split_keep_newlines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(idx) = rest.find('\n') {
        lines.push(rest[..=idx].to_string());
        rest = &rest[idx + 1..];
    }
    if !rest.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keep_newlines_preserves_line_endings() {
        let lines = split_keep_newlines("a\nb\nc");
        assert_eq!(lines, vec!["a\n".to_string(), "b\n".to_string(), "c".to_string()]);
    }

    #[test]
    fn child_payload_targets_gmi_output() {
        let parent = FormatterJobPayload {
            jobname: "docs".to_string(),
            input_path: PathBuf::from("/docs"),
            output_path: Some(PathBuf::from("/out")),
            is_dir: true,
            is_recursive: false,
            enabled_formatters: vec![],
            formatter_flags: HashMap::new(),
            heading: None,
            footing: None,
            preformatted_unicode_columns: 80,
        };

        let child = parent.child_for(PathBuf::from("/docs/readme.md"), &PathBuf::from("/out"));
        assert_eq!(child.output_path, Some(PathBuf::from("/out/readme.gmi")));
        assert!(!child.is_dir);
        assert_eq!(child.jobname, "docs/readme");
    }
}
