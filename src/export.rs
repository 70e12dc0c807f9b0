//! Report export for rendered diffs.
//!
//! Produces a plain-text report of both sides' renderings with change
//! markers (`-`/`+`/`~` per line, `[-…-]`/`{+…+}` inside rewritten lines)
//! and the serde payload used by the JSON output mode.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::diff::{DiffStats, RenderKind, RenderLine, SpanKind};
use crate::events::InputDocument;

/// Report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub include_stats: bool,
    pub include_metadata: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_stats: true,
            include_metadata: true,
        }
    }
}

/// JSON payload for the scripting output mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffPayload {
    pub left: Vec<RenderLine>,
    pub right: Vec<RenderLine>,
    pub stats: DiffStats,
}

/// Formats and writes plain-text diff reports.
pub struct DiffReporter {
    config: ReportConfig,
}

impl Default for DiffReporter {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

impl DiffReporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Format a full report: metadata header, stats summary, then each
    /// side's rendering.
    pub fn format_report(
        &self,
        left: &InputDocument,
        right: &InputDocument,
        left_lines: &[RenderLine],
        right_lines: &[RenderLine],
        stats: DiffStats,
    ) -> String {
        let mut content = String::new();

        if self.config.include_metadata {
            content.push_str(&self.format_metadata(left, right));
            content.push_str("\n\n");
        }

        if self.config.include_stats {
            content.push_str(&format!("Changes: {}\n\n", format_stats(&stats)));
        }

        content.push_str(&format!("--- {}\n", left.path.display()));
        content.push_str(&format_side(left_lines));
        content.push_str(&format!("\n+++ {}\n", right.path.display()));
        content.push_str(&format_side(right_lines));

        content
    }

    /// Write a report to a file.
    pub fn export_report<P: AsRef<Path>>(
        &self,
        left: &InputDocument,
        right: &InputDocument,
        left_lines: &[RenderLine],
        right_lines: &[RenderLine],
        stats: DiffStats,
        output_path: P,
    ) -> Result<()> {
        let content = self.format_report(left, right, left_lines, right_lines, stats);
        fs::write(output_path.as_ref(), content)?;
        Ok(())
    }

    /// Write a report to a writer (for streaming or custom outputs)
    pub fn export_to_writer<W: Write>(
        &self,
        left: &InputDocument,
        right: &InputDocument,
        left_lines: &[RenderLine],
        right_lines: &[RenderLine],
        stats: DiffStats,
        writer: &mut W,
    ) -> Result<()> {
        write!(
            writer,
            "{}",
            self.format_report(left, right, left_lines, right_lines, stats)
        )?;
        Ok(())
    }

    fn format_metadata(&self, left: &InputDocument, right: &InputDocument) -> String {
        format!(
            "Cell diff between {} and {}\nGenerated at: {}",
            left.path.display(),
            right.path.display(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Format one side's rendering as marker-prefixed lines.
pub fn format_side(lines: &[RenderLine]) -> String {
    let mut output = String::new();
    for line in lines {
        output.push_str(&format_line(line));
        output.push('\n');
    }
    output
}

/// Format one rendered line with its change marker.
pub fn format_line(line: &RenderLine) -> String {
    let marker = match line.kind {
        RenderKind::Unchanged => ' ',
        RenderKind::Removed => '-',
        RenderKind::Added => '+',
        RenderKind::Modified => '~',
    };

    let body: String = match line.kind {
        // Rewritten lines mark the changed runs inline, word-diff style.
        RenderKind::Modified => line
            .spans
            .iter()
            .map(|span| match span.kind {
                SpanKind::Normal => span.text.clone(),
                SpanKind::Deleted => format!("[-{}-]", span.text),
                SpanKind::Inserted => format!("{{+{}+}}", span.text),
            })
            .collect(),
        _ => line.text(),
    };

    format!("{}{}", marker, body)
}

/// Format diff statistics as a summary
pub fn format_stats(stats: &DiffStats) -> String {
    if stats.total_changes() == 0 {
        return "No changes".to_string();
    }

    let mut parts = Vec::new();

    if stats.lines_added > 0 {
        parts.push(format!(
            "{} insertion{}",
            stats.lines_added,
            if stats.lines_added == 1 { "" } else { "s" }
        ));
    }

    if stats.lines_removed > 0 {
        parts.push(format!(
            "{} deletion{}",
            stats.lines_removed,
            if stats.lines_removed == 1 { "" } else { "s" }
        ));
    }

    if stats.lines_modified > 0 {
        parts.push(format!(
            "{} rewritten line{}",
            stats.lines_modified,
            if stats.lines_modified == 1 { "" } else { "s" }
        ));
    }

    parts.join(", ")
}
