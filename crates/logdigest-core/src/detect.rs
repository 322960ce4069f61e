//! Content-kind detection
//!
//! Decides which pipeline a raw input belongs to by lexical sniffing only.
//! Malformed XML that merely looks like a test run still goes to the
//! test-results pipeline; anything else is treated as a build log.

use serde::{Deserialize, Serialize};
use tracing::debug;

const XML_DECLARATION: &str = "<?xml";
const TEST_RUN_OPEN: &str = "<test-run";
const CASE_COUNT_ATTR: &str = "testcasecount=";
const TEST_CASE_OPEN: &str = "<test-case";

/// The two kinds of input the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Free-form compiler/linker output
    BuildLog,
    /// NUnit-style test-result XML
    TestResults,
}

impl InputKind {
    /// Human-readable label used in logs and reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BuildLog => "build log",
            Self::TestResults => "test results",
        }
    }
}

/// Classify raw input text
///
/// Returns [`InputKind::TestResults`] iff the text (ignoring leading
/// whitespace) starts with an XML declaration, contains a `<test-run`
/// element, and contains either a `testcasecount=` attribute or at least
/// one `<test-case` element. Never fails.
#[must_use]
pub fn classify_input_kind(text: &str) -> InputKind {
    let trimmed = text.trim_start();
    let kind = if trimmed.starts_with(XML_DECLARATION)
        && trimmed.contains(TEST_RUN_OPEN)
        && (trimmed.contains(CASE_COUNT_ATTR) || trimmed.contains(TEST_CASE_OPEN))
    {
        InputKind::TestResults
    } else {
        InputKind::BuildLog
    };
    debug!(kind = kind.label(), bytes = text.len(), "classified input");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nunit_document_is_test_results() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<test-run id="2" testcasecount="1" total="1" passed="1" failed="0" skipped="0">
</test-run>"#;
        assert_eq!(classify_input_kind(xml), InputKind::TestResults);
    }

    #[test]
    fn test_leading_whitespace_is_ignored() {
        let xml = "\n\n   <?xml version=\"1.0\"?>\n<test-run>\n<test-case name=\"A\" />";
        assert_eq!(classify_input_kind(xml), InputKind::TestResults);
    }

    #[test]
    fn test_test_case_marker_without_count_attribute() {
        let xml = "<?xml version=\"1.0\"?><test-run><test-case name=\"A\" result=\"Passed\"/>";
        assert_eq!(classify_input_kind(xml), InputKind::TestResults);
    }

    #[test]
    fn test_missing_declaration_is_build_log() {
        let xml = "<test-run testcasecount=\"1\"><test-case name=\"A\"/></test-run>";
        assert_eq!(classify_input_kind(xml), InputKind::BuildLog);
    }

    #[test]
    fn test_other_xml_is_build_log() {
        let xml = "<?xml version=\"1.0\"?><Project><Target Name=\"Build\"/></Project>";
        assert_eq!(classify_input_kind(xml), InputKind::BuildLog);
    }

    #[test]
    fn test_test_run_without_cases_is_build_log() {
        let xml = "<?xml version=\"1.0\"?><test-run id=\"1\"></test-run>";
        assert_eq!(classify_input_kind(xml), InputKind::BuildLog);
    }

    #[test]
    fn test_free_text_is_build_log() {
        assert_eq!(
            classify_input_kind("error C2065: 'x': undeclared identifier"),
            InputKind::BuildLog
        );
        assert_eq!(classify_input_kind(""), InputKind::BuildLog);
    }
}
