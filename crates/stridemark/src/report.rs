//! Rendering of validation results.
//!
//! [`ReportBuilder`] turns a [`ValidationResult`] into two texts: the full
//! validation log written next to the output, and a shorter console summary.
//! Rendering is deterministic; the only varying input is the timestamp, which
//! callers may inject with [`ReportBuilder::with_timestamp`].

use std::fmt;

use chrono::Local;

use crate::{
    diagnostic::{Diagnostic, Severity},
    reconcile::ValidationResult,
};

const RULE: &str = "============================================================";

/// Timestamp format used in log headers and log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Rendered texts of one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    log_text: String,
    summary_text: String,
}

impl Report {
    /// Full text for the validation log file.
    pub fn log_text(&self) -> &str {
        &self.log_text
    }

    /// Condensed text for the console.
    pub fn summary_text(&self) -> &str {
        &self.summary_text
    }
}

/// Builds [`Report`]s for one source document.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    source_name: String,
    timestamp: String,
}

impl ReportBuilder {
    /// Creates a builder for `source_name` stamped with the current local time.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Replaces the timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Returns the timestamp used in the header and file name.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns the log file name: `validation_log_<stem>_<timestamp>.log`.
    pub fn log_file_name(&self) -> String {
        let stem = self
            .source_name
            .strip_suffix(".json")
            .unwrap_or(&self.source_name);
        format!("validation_log_{stem}_{}.log", self.timestamp)
    }

    /// Renders both texts for `result`.
    pub fn build(&self, result: &ValidationResult) -> Report {
        Report {
            log_text: LogText {
                builder: self,
                result,
            }
            .to_string(),
            summary_text: SummaryText { result }.to_string(),
        }
    }
}

// =============================================================================
// Text Layouts
// =============================================================================

struct LogText<'a> {
    builder: &'a ReportBuilder,
    result: &'a ValidationResult,
}

impl fmt::Display for LogText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let stats = result.stats();

        writeln!(f, "THREAT VALIDATION LOG")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Timestamp: {}", self.builder.timestamp)?;
        writeln!(f, "Model File: {}", self.builder.source_name)?;
        writeln!(f)?;
        writeln!(f, "VALIDATION NOTES:")?;
        writeln!(f, "- Trust boundary boxes and curves are excluded from validation")?;
        writeln!(f, "- Missing elements are informational, not errors")?;
        writeln!(f, "- Findings for ineligible elements are warnings, not errors")?;
        writeln!(f, "- Only a response with no element ids in common with the model is an error")?;
        writeln!(f)?;
        writeln!(f, "VALIDATION SUMMARY:")?;
        writeln!(f, "Overall Status: {}", status(result))?;
        writeln!(f, "Elements in Scope: {}", stats.in_scope_count)?;
        writeln!(f, "Elements with Findings: {}", stats.responded_count)?;
        writeln!(f, "Total Findings Generated: {}", stats.total_findings)?;
        writeln!(f, "Coverage: {:.1}%", stats.coverage_percent)?;
        writeln!(f)?;
        writeln!(f, "VALIDATION RESULTS:")?;
        write_groups(f, result)?;
        writeln!(f)?;
        writeln!(f, "RESPONSE PREVIEW:")?;
        writeln!(f, "Total Responses: {}", result.response_ids().len())?;
        writeln!(f, "Response IDs: {:?}", result.response_ids())
    }
}

struct SummaryText<'a> {
    result: &'a ValidationResult,
}

impl fmt::Display for SummaryText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let stats = result.stats();

        writeln!(f, "{RULE}")?;
        writeln!(f, "THREAT VALIDATION SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Overall Status: {}", status(result))?;
        writeln!(f, "Elements in Scope: {}", stats.in_scope_count)?;
        writeln!(f, "Elements with Findings: {}", stats.responded_count)?;
        writeln!(f, "Coverage: {:.1}%", stats.coverage_percent)?;
        writeln!(f, "Total Findings Generated: {}", stats.total_findings)?;
        write_groups(f, result)?;
        writeln!(f, "{RULE}")
    }
}

fn status(result: &ValidationResult) -> &'static str {
    if result.is_valid() { "VALID" } else { "INVALID" }
}

/// Writes non-empty diagnostic groups in severity order.
fn write_groups(f: &mut fmt::Formatter<'_>, result: &ValidationResult) -> fmt::Result {
    for (severity, heading) in [
        (Severity::Error, "ERRORS"),
        (Severity::Warning, "WARNINGS"),
        (Severity::Info, "INFO"),
    ] {
        let group: Vec<&Diagnostic> = result
            .diagnostics()
            .iter()
            .filter(|diag| diag.severity() == severity)
            .collect();
        if group.is_empty() {
            continue;
        }

        writeln!(f)?;
        writeln!(f, "{heading} ({}):", group.len())?;
        for diag in group {
            writeln!(f, "  • [{}] {}", diag.code(), diag.message())?;
        }
    }
    Ok(())
}
