//! Build-log extraction
//!
//! Scans free-form compiler/linker output line by line and keeps only the
//! lines the [pattern library](crate::patterns) classifies as errors or
//! warnings.
//!
//! Two passes over the same lines:
//! 1. file discovery, unfiltered, so a caller can always offer the full list
//!    of candidate files;
//! 2. record building, honoring the file filter and the retention caps.
//!
//! Caps limit the retained lists only. Scanning continues past them so the
//! totals in [`BuildLogResult`] count every match that passed the filter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::FilterOptions;
pub use crate::patterns::Severity;
use crate::patterns::{classify_line, find_file_ref};

/// A matched error or warning line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number in the input
    pub line_number: usize,
    /// The matched line, verbatim
    pub text: String,
    /// Raw lines immediately preceding the match (errors only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// Source file named on the line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number within `file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_line: Option<u32>,
}

/// An error line with optional context
pub type ErrorRecord = Diagnostic;

/// A warning line; never carries context
pub type WarningRecord = Diagnostic;

/// Everything extracted from one build log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogResult {
    /// Retained errors, at most `max_errors`
    pub errors: Vec<ErrorRecord>,
    /// Retained warnings, at most `max_warnings`; empty when warnings are off
    pub warnings: Vec<WarningRecord>,
    /// Unique file basenames from every error/warning line, ignoring filters
    pub files: BTreeSet<String>,
    /// Number of lines in the input
    pub total_lines: usize,
    /// Error lines that passed the file filter, including those past the cap
    pub error_count: usize,
    /// Warning lines that passed the file filter, including those past the cap
    pub warning_count: usize,
}

impl BuildLogResult {
    /// Whether more errors matched than were retained
    #[must_use]
    pub fn errors_truncated(&self) -> bool {
        self.error_count > self.errors.len()
    }

    /// Whether more warnings matched than were retained
    #[must_use]
    pub fn warnings_truncated(&self) -> bool {
        self.warning_count > self.warnings.len()
    }
}

/// Extract errors, warnings and file names from a build log
///
/// Total over any input: empty or diagnostic-free text yields an empty
/// result.
#[must_use]
pub fn extract_build_log(text: &str, options: &FilterOptions) -> BuildLogResult {
    let lines: Vec<&str> = text.lines().collect();
    let classified: Vec<Option<Severity>> = lines.iter().map(|l| classify_line(l)).collect();

    let mut result = BuildLogResult {
        total_lines: lines.len(),
        ..Default::default()
    };

    // Pass 1: file discovery, filters ignored.
    for (line, _) in lines
        .iter()
        .zip(&classified)
        .filter(|(_, severity)| severity.is_some())
    {
        if let Some(file) = find_file_ref(line) {
            result.files.insert(file.name);
        }
    }

    // Pass 2: records.
    let filter = &options.file_filters;
    for (idx, (line, severity)) in lines.iter().zip(&classified).enumerate() {
        let Some(severity) = severity else {
            continue;
        };
        let file_ref = find_file_ref(line);
        if !filter.retains(file_ref.as_ref().map(|f| f.name.as_str())) {
            continue;
        }

        let (file, file_line) = match file_ref {
            Some(f) => (Some(f.name), f.line),
            None => (None, None),
        };

        match severity {
            Severity::Error => {
                result.error_count += 1;
                if result.errors.len() >= options.max_errors {
                    continue;
                }
                let context = if options.context_lines > 0 {
                    let start = idx.saturating_sub(options.context_lines);
                    lines[start..idx].iter().map(|l| (*l).to_string()).collect()
                } else {
                    Vec::new()
                };
                result.errors.push(Diagnostic {
                    line_number: idx + 1,
                    text: (*line).to_string(),
                    context,
                    file,
                    file_line,
                });
            }
            Severity::Warning => {
                result.warning_count += 1;
                if !options.show_warnings || result.warnings.len() >= options.max_warnings {
                    continue;
                }
                result.warnings.push(Diagnostic {
                    line_number: idx + 1,
                    text: (*line).to_string(),
                    context: Vec::new(),
                    file,
                    file_line,
                });
            }
        }
    }

    debug!(
        lines = result.total_lines,
        errors = result.error_count,
        warnings = result.warning_count,
        retained_errors = result.errors.len(),
        retained_warnings = result.warnings.len(),
        files = result.files.len(),
        "extracted build log"
    );
    result
}
