//! Report rendering
//!
//! Pure functions from an extraction result to a fixed-format report. The
//! same input always renders to byte-identical text; nothing time- or
//! environment-dependent goes into a report.

use serde::{Deserialize, Serialize};

use crate::build_log::{BuildLogResult, Diagnostic};
use crate::digest::Extraction;
use crate::options::{FilterOptions, OutputFormat};
use crate::test_results::{CountsSource, FailedTest, TestResultsResult};

const ERRORS_MARKER: &str = "=== ERRORS ===";
const WARNINGS_MARKER: &str = "=== WARNINGS ===";
const FAILED_TESTS_MARKER: &str = "=== FAILED TESTS ===";

/// Summary record for a build log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogSummary {
    /// Lines in the input
    pub total_lines: usize,
    /// Error lines passing the file filter
    pub error_count: usize,
    /// Warning lines passing the file filter
    pub warning_count: usize,
    /// Errors present in the report
    pub errors_shown: usize,
    /// Warnings present in the report
    pub warnings_shown: usize,
    /// Lines in the rendered report
    pub filtered_line_count: usize,
}

/// Summary record for a test-result document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultsSummary {
    /// Total test cases
    pub total_tests: usize,
    /// Passed test cases
    pub passed: usize,
    /// Failed tests with diagnostics passing the file filter
    pub failed: usize,
    /// Skipped test cases
    pub skipped: usize,
    /// `failed` attribute declared on the root element, if readable
    pub declared_failed: Option<usize>,
    /// Where `total_tests`, `passed` and `skipped` came from
    pub counts_source: CountsSource,
    /// Failed tests present in the report
    pub failures_shown: usize,
    /// Lines in the rendered report
    pub filtered_line_count: usize,
}

/// Aggregate counts for either pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    /// Build-log counts
    BuildLog(BuildLogSummary),
    /// Test-result counts
    TestResults(TestResultsSummary),
}

/// Rendered text plus its summary record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The report body
    pub text: String,
    /// Counts describing the report
    pub summary: Summary,
}

/// Render whichever pipeline produced `extraction`
#[must_use]
pub fn render_report(extraction: &Extraction, options: &FilterOptions) -> Report {
    match extraction {
        Extraction::BuildLog(result) => render_build_log(result, options),
        Extraction::TestResults(result) => render_test_results(result, options),
    }
}

// ============================================================================
// Build Logs
// ============================================================================

/// Render a build-log extraction
#[must_use]
pub fn render_build_log(result: &BuildLogResult, options: &FilterOptions) -> Report {
    let text = match options.format {
        OutputFormat::Full => build_log_full(result, options),
        OutputFormat::Minimal => build_log_minimal(result, options),
    };
    let summary = Summary::BuildLog(BuildLogSummary {
        total_lines: result.total_lines,
        error_count: result.error_count,
        warning_count: result.warning_count,
        errors_shown: result.errors.len(),
        warnings_shown: result.warnings.len(),
        filtered_line_count: text.lines().count(),
    });
    Report { text, summary }
}

fn build_log_minimal(result: &BuildLogResult, options: &FilterOptions) -> String {
    let mut out = String::new();
    push_minimal_section(&mut out, ERRORS_MARKER, &result.errors, "(no errors found)");
    if options.show_warnings {
        push_minimal_section(
            &mut out,
            WARNINGS_MARKER,
            &result.warnings,
            "(no warnings found)",
        );
    }
    out
}

fn push_minimal_section(out: &mut String, marker: &str, items: &[Diagnostic], empty: &str) {
    out.push_str(marker);
    out.push('\n');
    if items.is_empty() {
        out.push_str(empty);
        out.push('\n');
    }
    for item in items {
        out.push_str(&item.text);
        out.push('\n');
    }
}

fn build_log_full(result: &BuildLogResult, options: &FilterOptions) -> String {
    let mut out = String::from("# Build Log Summary\n\n");

    let mut header = format!(
        "**Lines scanned:** {} | **Errors:** {}",
        result.total_lines, result.error_count
    );
    if options.show_warnings {
        header.push_str(&format!(" | **Warnings:** {}", result.warning_count));
    }
    out.push_str(&header);
    out.push('\n');
    if options.file_filters.is_active() {
        let filters: Vec<&str> = options.file_filters.entries().collect();
        out.push_str(&format!("**File filter:** {}\n", filters.join(", ")));
    }

    out.push_str(&format!("\n## Errors ({})\n\n", result.error_count));
    if result.errors.is_empty() {
        out.push_str("No errors found.\n");
    }
    for (idx, error) in result.errors.iter().enumerate() {
        out.push_str(&format!("### Error {} (line {})\n\n", idx + 1, error.line_number));
        if !error.context.is_empty() {
            for line in &error.context {
                out.push_str(&format!("> {line}\n"));
            }
            out.push('\n');
        }
        out.push_str("**Error:**\n\n");
        push_fenced(&mut out, &error.text);
        out.push('\n');
    }
    if result.errors_truncated() {
        out.push_str(&format!(
            "_Showing first {} of {} errors._\n",
            result.errors.len(),
            result.error_count
        ));
    }

    if options.show_warnings {
        out.push_str(&format!("\n## Warnings ({})\n\n", result.warning_count));
        if result.warnings.is_empty() {
            out.push_str("No warnings found.\n");
        }
        for warning in &result.warnings {
            out.push_str(&format!("- [Line {}] {}\n", warning.line_number, warning.text));
        }
        if result.warnings_truncated() {
            out.push_str(&format!(
                "\n_Showing first {} of {} warnings._\n",
                result.warnings.len(),
                result.warning_count
            ));
        }
    }
    out
}

// ============================================================================
// Test Results
// ============================================================================

/// Render a test-result extraction
#[must_use]
pub fn render_test_results(result: &TestResultsResult, options: &FilterOptions) -> Report {
    let text = match options.format {
        OutputFormat::Full => test_results_full(result, options),
        OutputFormat::Minimal => test_results_minimal(result),
    };
    let (counts, counts_source) = result.counts();
    let summary = Summary::TestResults(TestResultsSummary {
        total_tests: counts.total,
        passed: counts.passed,
        failed: result.failed_count,
        skipped: counts.skipped,
        declared_failed: result.declared.map(|d| d.failed),
        counts_source,
        failures_shown: result.failed_tests.len(),
        filtered_line_count: text.lines().count(),
    });
    Report { text, summary }
}

fn test_results_minimal(result: &TestResultsResult) -> String {
    let mut out = format!("{FAILED_TESTS_MARKER}\n");
    if result.failed_tests.is_empty() {
        out.push_str("(no failed tests found)\n");
    }
    for test in &result.failed_tests {
        let first_line = test
            .message
            .lines()
            .next()
            .or_else(|| test.stack_trace.lines().next())
            .unwrap_or_default();
        out.push_str(&format!("{}: {}\n", test.name, first_line));
    }
    out
}

fn test_results_full(result: &TestResultsResult, options: &FilterOptions) -> String {
    let (counts, _) = result.counts();
    let mut out = String::from("# Test Results\n\n");
    out.push_str(&format!(
        "**Total:** {} | **Passed:** {} | **Failed:** {} | **Skipped:** {}\n",
        counts.total, counts.passed, result.failed_count, counts.skipped
    ));
    if options.file_filters.is_active() {
        let filters: Vec<&str> = options.file_filters.entries().collect();
        out.push_str(&format!("**File filter:** {}\n", filters.join(", ")));
    }
    if counts.failed != result.failed_count {
        out.push_str(&format!(
            "\n> Note: {} test(s) reported as failed; {} with a message or stack trace shown.\n",
            counts.failed, result.failed_count
        ));
    }

    if result.failed_tests.is_empty() {
        out.push_str("\nAll tests passed.\n");
        return out;
    }

    out.push_str(&format!("\n## Failed Tests ({})\n\n", result.failed_count));
    for (idx, test) in result.failed_tests.iter().enumerate() {
        push_failed_test(&mut out, idx + 1, test, options);
    }
    if result.failures_truncated() {
        out.push_str(&format!(
            "_Showing first {} of {} failed tests._\n",
            result.failed_tests.len(),
            result.failed_count
        ));
    }
    out
}

fn push_failed_test(out: &mut String, number: usize, test: &FailedTest, options: &FilterOptions) {
    out.push_str(&format!("### {}. {}\n\n", number, test.name));
    if let Some(full_name) = &test.full_name {
        out.push_str(&format!("**Full name:** `{full_name}`\n\n"));
    }

    out.push_str("**Message:**\n\n");
    if test.message.is_empty() {
        push_fenced(out, "(no message)");
    } else {
        push_fenced(out, &test.message);
    }

    if options.show_stack_traces && !test.stack_trace.is_empty() {
        out.push_str("\n**Stack trace:**\n\n");
        push_fenced(out, &test.stack_trace);
    }
    if options.show_output && !test.console_output.is_empty() {
        out.push_str("\n**Output:**\n\n");
        push_fenced(out, &test.console_output);
    }
    out.push_str("\n---\n\n");
}

/// Append `content` as a fenced block whose fence outlasts any backtick run inside
fn push_fenced(out: &mut String, content: &str) {
    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    out.push_str(&format!("{fence}text\n{content}\n{fence}\n"));
}
